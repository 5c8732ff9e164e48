use std::io::{self, BufRead, IsTerminal, Write};
use std::process::ExitCode;

use mtg_wishlist::{
    CredentialStore, Credentials, Settings, WishlistClient, WishlistError,
};

const USAGE: &str = "USAGE: env MTG_COOKIE=\"$(mtg login)\" mtg cards";

enum Command {
    Login { email: Option<String>, save: bool },
    Cards,
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<Command, String> {
    let action = args.next().ok_or("missing action (login or cards)")?;
    match action.as_str() {
        "login" => {
            let mut email = None;
            let mut save = false;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--email" => email = Some(args.next().ok_or("--email needs a value")?),
                    "--save" => save = true,
                    other => {
                        if let Some(value) = other.strip_prefix("--email=") {
                            email = Some(value.to_string());
                        } else {
                            return Err(format!("unexpected argument {:?}", other));
                        }
                    }
                }
            }
            Ok(Command::Login { email, save })
        }
        "cards" | "wishlist" => match args.next() {
            Some(extra) => Err(format!("unexpected argument {:?}", extra)),
            None => Ok(Command::Cards),
        },
        other => Err(format!("unknown action {:?} (expected login or cards)", other)),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// Ask on stderr, read one line from stdin. EOF counts as an interrupt.
fn prompt(desc: &str) -> Result<String, WishlistError> {
    eprint!("Card Kingdom {}: ", desc);
    io::stderr().flush()?;
    read_line()
}

/// Like [`prompt`], but a terminal does not echo what is typed.
fn prompt_hidden(desc: &str) -> Result<String, WishlistError> {
    let text = format!("Card Kingdom {}: ", desc);
    if !io::stdin().is_terminal() {
        eprint!("{}", text);
        io::stderr().flush()?;
        return read_line();
    }
    match rpassword::prompt_password(text) {
        Ok(secret) => Ok(secret),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(WishlistError::Interrupted),
        Err(e) => Err(e.into()),
    }
}

fn read_line() -> Result<String, WishlistError> {
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Err(WishlistError::Interrupted);
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Ctrl-C at a prompt ends the process with status 1.
fn install_interrupt_handler() {
    let installed = ctrlc::set_handler(|| {
        eprintln!();
        std::process::exit(1);
    });
    if let Err(e) = installed {
        tracing::warn!("Could not install Ctrl-C handler: {}", e);
    }
}

/// Load `.env` from the working directory, then from next to the executable.
/// Variables already set win over either file.
fn load_dotenv() -> Vec<dotenvy::Error> {
    let mut results = vec![dotenvy::dotenv().map(drop)];
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(".env")));
    if let Some(path) = exe_dir {
        results.push(dotenvy::from_path(path));
    }
    results
        .into_iter()
        .filter_map(|r| r.err())
        .filter(|e| !e.not_found())
        .collect()
}

/// Stored credentials: `MTG_SECRET` (or `MTG_CREDENTIALS`) first, then the credential file.
fn stored_credentials(settings: &Settings) -> Result<Option<Credentials>, WishlistError> {
    if let Some(creds) = &settings.credentials {
        return Ok(Some(creds.clone()));
    }
    CredentialStore::new(&settings.credentials_file).latest()
}

fn login(
    settings: &Settings,
    client: &WishlistClient,
    email: Option<String>,
    save: bool,
) -> Result<(), WishlistError> {
    let stored = stored_credentials(settings)?;
    let identity = match email.or_else(|| {
        stored
            .as_ref()
            .map(|c| c.identity.clone())
            .filter(|i| !i.is_empty())
    }) {
        Some(identity) => identity,
        None => prompt("email is")?,
    };
    let secret = match stored.and_then(|c| c.secret) {
        Some(secret) => secret,
        None => prompt_hidden(&format!("password for {}", identity))?,
    };

    let auth = client.auth();
    if save {
        let token = auth.login_verified(&identity, &secret)?;
        CredentialStore::new(&settings.credentials_file)
            .append(&Credentials::new(identity, secret))?;
        println!("{}", token);
        return Ok(());
    }

    match auth.authenticate(&identity, &secret) {
        Ok(token) => println!("{}", token),
        Err(e) if e.is_transport() => {
            eprintln!("--- during login: {}", e);
            println!();
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

fn cards(settings: &Settings, client: &WishlistClient) -> Result<(), WishlistError> {
    let token = match &settings.session {
        Some(token) => token.clone(),
        None => {
            let creds = stored_credentials(settings)?
                .filter(Credentials::is_complete)
                .ok_or_else(|| {
                    WishlistError::Configuration("missing MTG_COOKIE or MTG_SECRET for login".into())
                })?;
            let secret = creds.secret.as_deref().unwrap_or_default();
            client.auth().authenticate(&creds.identity, secret)?
        }
    };

    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut out = stdout.lock();
    let mut diag = stderr.lock();
    client.report(
        &token,
        settings.max_pages,
        settings.format,
        settings.threshold,
        &mut out,
        &mut diag,
    )?;
    Ok(())
}

fn main() -> ExitCode {
    let dotenv_errors = load_dotenv();
    init_tracing();
    for e in dotenv_errors {
        tracing::warn!("Ignoring unreadable .env file: {}", e);
    }
    install_interrupt_handler();

    let command = match parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(msg) => {
            eprintln!("--- {}; {}", msg, USAGE);
            return ExitCode::FAILURE;
        }
    };
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("--- {}; {}", e, USAGE);
            return ExitCode::FAILURE;
        }
    };

    let result = WishlistClient::builder()
        .settings(&settings)
        .build()
        .and_then(|client| match command {
            Command::Login { email, save } => login(&settings, &client, email, save),
            Command::Cards => cards(&settings, &client),
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(WishlistError::Interrupted) => ExitCode::FAILURE,
        Err(e @ WishlistError::Configuration(_)) => {
            eprintln!("--- {}; {}", e, USAGE);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("--- CK wishlist failure: {}", e);
            ExitCode::FAILURE
        }
    }
}
