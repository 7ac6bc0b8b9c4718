use serenity::all::{CommandDataOptionValue, CommandInteraction};
use tracing::debug;

use crate::types::{CommandArgs, CommandEvent, CommandName};

/// Option value as far as the wheel commands care.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArgValue<'a> {
    Text(&'a str),
    Integer(i64),
    Other,
}

impl<'a> From<&'a CommandDataOptionValue> for ArgValue<'a> {
    fn from(value: &'a CommandDataOptionValue) -> Self {
        match value {
            CommandDataOptionValue::String(s) => ArgValue::Text(s),
            CommandDataOptionValue::Integer(i) => ArgValue::Integer(*i),
            _ => ArgValue::Other,
        }
    }
}

/// Where a command came from and who sent it.
#[derive(Debug, Clone)]
pub struct CommandOrigin {
    pub guild_id: Option<String>,
    /// `None` when the interaction did not include the resolved channel.
    pub channel_name: Option<String>,
    pub channel_id: String,
    pub user_name: String,
}

/// Collect the `option` and `index` arguments. Unknown names are ignored.
pub fn parse_args<'a>(options: impl IntoIterator<Item = (&'a str, ArgValue<'a>)>) -> CommandArgs {
    let mut args = CommandArgs::default();
    for (name, value) in options {
        match (name, value) {
            ("option", ArgValue::Text(text)) => args.option = Some(text.to_string()),
            ("option", ArgValue::Integer(i)) => args.option = Some(i.to_string()),
            ("index", ArgValue::Integer(i)) => args.index = Some(i),
            ("index", ArgValue::Text(text)) => args.index = text.trim().parse().ok(),
            (name, _) => debug!(option = name, "ignoring command option"),
        }
    }
    args
}

/// Build the event for command `name`. The channel id stands in for a missing channel name.
pub fn command_event(name: &str, origin: CommandOrigin, args: CommandArgs) -> CommandEvent {
    CommandEvent {
        command: CommandName::parse(name),
        guild_id: origin.guild_id,
        channel_name: origin.channel_name.unwrap_or(origin.channel_id),
        user_name: origin.user_name,
        args,
    }
}

pub fn from_interaction(interaction: &CommandInteraction) -> CommandEvent {
    let args = parse_args(
        interaction
            .data
            .options
            .iter()
            .map(|opt| (opt.name.as_str(), ArgValue::from(&opt.value))),
    );
    let origin = CommandOrigin {
        guild_id: interaction.guild_id.map(|id| id.to_string()),
        channel_name: interaction.channel.as_ref().and_then(|c| c.name.clone()),
        channel_id: interaction.channel_id.to_string(),
        user_name: interaction.user.name.clone(),
    };
    command_event(&interaction.data.name, origin, args)
}
