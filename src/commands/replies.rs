//! User-facing reply texts.

use crate::wheel::OptionList;

pub const EMPTY_WHEEL: &str = "No options on the wheel, add options using the '/add' command";
pub const INDEX_OUT_OF_RANGE: &str = "index out of range";
pub const REMOVE_MISSING_ARGUMENT: &str = "Please add a parameter to indicate which option to delete";
pub const ADD_MISSING_ARGUMENT: &str = "Please provide the option to add to the wheel";
pub const UNKNOWN_COMMAND: &str = "Unknown command";
pub const CONFLICT: &str = "The wheel was changed by someone else at the same time, please try again";
pub const GENERIC_FAILURE: &str = "Error :(";

pub const SPIN_FILE_NAME: &str = "FullAnimation.gif";
pub const PREVIEW_FILE_NAME: &str = "preview.png";

pub fn added(user: &str, option: &str, options: &OptionList) -> String {
    format!("{user} added {option} to the wheel!\nThe full list of options is now {options}")
}

pub fn removed(user: &str, option: &str, options: &OptionList) -> String {
    format!("{user} removed {option} from the wheel!\nThe full list of options is now {options}")
}

pub fn not_on_wheel(option: &str) -> String {
    format!("'{option}' is not on the wheel")
}

pub fn cleared(user: &str, options: &OptionList) -> String {
    format!("{user} cleared the wheel!\nThe full list of options is now {options}")
}

pub fn new_order(options: &OptionList) -> String {
    format!("The new order of options is {options}")
}

pub fn full_list(options: &OptionList) -> String {
    format!("The full list of options is {options}")
}

pub fn winner(option: &str) -> String {
    format!("The wheel landed on {option}!")
}

pub fn wrong_channel(prefix: &str) -> String {
    format!("Wheel commands only work in channels whose name starts with '{prefix}'")
}
