use std::io;

use postdeck_core::twitter::credential_file::TwitterCredentialFile;
use postdeck_scripts::{common::exit_with, list::list_accounts};

fn main() {
    dotenvy::dotenv().ok();
    let file = TwitterCredentialFile::from_env();
    exit_with(list_accounts(&file, &mut io::stdout(), &mut io::stderr()))
}
