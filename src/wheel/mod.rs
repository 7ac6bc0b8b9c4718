pub mod options;
pub mod selector;

pub use options::OptionList;
