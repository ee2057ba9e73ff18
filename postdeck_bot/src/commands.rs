use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "Open the main menu.")]
    Start,
    #[command(description = "Open the main menu.")]
    Menu,
    #[command(description = "Compose a new post.")]
    New,
    #[command(description = "Show post status filters.")]
    Status,
    #[command(description = "Manage Twitter accounts.")]
    Accounts,
    #[command(description = "Change the bot language.")]
    Language,
    #[command(description = "How scheduling works.")]
    Help,
}
