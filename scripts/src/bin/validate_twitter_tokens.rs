use std::io;

use postdeck_scripts::{
    common::{exit_with, ScriptContext},
    validate::validate_tokens,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let ctx = ScriptContext::from_env();
    exit_with(validate_tokens(&ctx, &mut io::stdout(), &mut io::stderr()).await)
}
