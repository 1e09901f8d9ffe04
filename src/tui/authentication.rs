use std::io::{self, Write};

use calstrip::storage::config::Config;
use calstrip::sync::{AuthError, GoogleAuthenticator, SessionTokens};

pub async fn connect_accounts(config: &Config) -> anyhow::Result<SessionTokens> {
    if !config.has_credentials() {
        println!("Configuration incomplete. Please edit the config file at:");
        println!("{}", Config::config_path().display());
        println!("\nYou need to set:");
        println!("  - google.client_id: Your Google OAuth2 client ID");
        println!("  - google.client_secret: Your Google OAuth2 client secret");
        println!("\nGet these from: https://console.cloud.google.com/apis/credentials");
        anyhow::bail!("Missing Google OAuth credentials in config");
    }

    let auth = GoogleAuthenticator::new(&config.google);
    let mut tokens = SessionTokens::new();

    for account in config.accounts.enabled() {
        println!("\n=== Connect {} calendar ===\n", account);
        println!("1. Visit this URL in your browser:\n");
        println!("{}\n", auth.auth_url(account));
        println!("2. Sign in with your {} Google account and allow read-only access", account);
        println!("3. Copy the 'code' parameter from the localhost:8080 redirect");
        print!("Authorization code (leave empty to skip): ");
        io::stdout().flush()?;

        let mut code = String::new();
        io::stdin().read_line(&mut code)?;

        match auth.connect(&mut tokens, account, Some(code.as_str())).await {
            Ok(()) => println!("Connected {} calendar.", account),
            Err(AuthError::Cancelled(_)) => println!("Skipped {} calendar.", account),
            Err(e) => eprintln!("Could not connect {} calendar: {}", account, e),
        }
    }

    Ok(tokens)
}
