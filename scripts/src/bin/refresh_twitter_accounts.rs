use std::io;

use postdeck_scripts::{
    common::{exit_with, ScriptContext},
    refresh::refresh_accounts,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let ctx = ScriptContext::from_env();
    exit_with(refresh_accounts(&ctx, &mut io::stdout(), &mut io::stderr()).await)
}
