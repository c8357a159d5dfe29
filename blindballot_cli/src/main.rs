use clap::{App, AppSettings, Arg, SubCommand};
use config::Config;

mod command_blind;
mod command_e2e;
mod command_keygen;
mod command_sign;
mod command_verify;
mod config;
mod keys;

use command_blind::*;
use command_e2e::*;
use command_keygen::*;
use command_sign::*;
use command_verify::*;

fn main() {
    let public_key_arg = Arg::with_name("public-key")
        .long("public-key")
        .takes_value(true)
        .help("Vote session public key (PEM) - can also be set with BLINDBALLOT_PUBLIC_KEY");

    let matches = App::new("BlindBallot CLI")
        .version("0.1")
        .author("Patrick Hayes <patrick.d.hayes@gmail.com>")
        .about("Blind-signed anonymous voting credentials")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .global(true)
                .help("Sets the level of verbosity"),
        )
        .subcommand(
            SubCommand::with_name("keygen")
                .about("Generate a vote session key pair")
                .arg(
                    Arg::with_name("secret")
                        .long("secret")
                        .takes_value(true)
                        .required(true)
                        .help("File to write the private key to"),
                )
                .arg(
                    Arg::with_name("bits")
                        .long("bits")
                        .takes_value(true)
                        .default_value("2048")
                        .help("Modulus size in bits"),
                ),
        )
        .subcommand(
            SubCommand::with_name("blind")
                .about("Blind a message (voter side)")
                .arg(public_key_arg.clone())
                .arg(
                    Arg::with_name("MESSAGE")
                        .index(1)
                        .required(true)
                        .help("Message to blind, usually a candidate token"),
                ),
        )
        .subcommand(
            SubCommand::with_name("sign")
                .about("Sign a blinded value (signer side)")
                .arg(
                    Arg::with_name("secret")
                        .long("secret")
                        .takes_value(true)
                        .help(
                            "Vote session private key (PEM) - \
                             can also be set with BLINDBALLOT_SECRET_KEY",
                        ),
                )
                .arg(
                    Arg::with_name("BLINDED-VALUE")
                        .index(1)
                        .required(true)
                        .help("Blinded value in hex"),
                ),
        )
        .subcommand(
            SubCommand::with_name("unblind")
                .about("Unblind a blind signature (voter side)")
                .arg(public_key_arg.clone())
                .arg(
                    Arg::with_name("BLIND-SIGNATURE")
                        .index(1)
                        .required(true)
                        .help("Blind signature in hex"),
                )
                .arg(
                    Arg::with_name("BLINDING-FACTOR")
                        .index(2)
                        .required(true)
                        .help("Blinding factor in hex, as printed by `blind`"),
                ),
        )
        .subcommand(
            SubCommand::with_name("verify")
                .about("Verify an unblinded signature")
                .arg(public_key_arg)
                .arg(
                    Arg::with_name("SIGNATURE")
                        .index(1)
                        .required(true)
                        .help("Unblinded signature in hex"),
                )
                .arg(
                    Arg::with_name("MESSAGE")
                        .index(2)
                        .required(true)
                        .help("The message that was blinded"),
                ),
        )
        .subcommand(
            SubCommand::with_name("e2e")
                .about("Run an in-memory vote session end to end")
                .arg(
                    Arg::with_name("bits")
                        .long("bits")
                        .takes_value(true)
                        .default_value("2048")
                        .help("Modulus size in bits"),
                )
                .arg(
                    Arg::with_name("CANDIDATES")
                        .index(1)
                        .multiple(true)
                        .required(true)
                        .help("One vote is cast for each candidate given"),
                ),
        )
        .get_matches();

    let level = match matches.occurrences_of("v") {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    // Subcommands
    match matches.subcommand() {
        ("keygen", Some(matches)) => command_keygen(matches),
        ("blind", Some(matches)) => {
            command_blind(matches, &Config::from_env().with_matches(matches))
        }
        ("sign", Some(matches)) => command_sign(matches, &Config::from_env().with_matches(matches)),
        ("unblind", Some(matches)) => {
            command_unblind(matches, &Config::from_env().with_matches(matches))
        }
        ("verify", Some(matches)) => {
            command_verify(matches, &Config::from_env().with_matches(matches))
        }
        ("e2e", Some(matches)) => command_e2e(matches),
        _ => unreachable!(),
    }
}

pub fn expand(input: &str) -> String {
    shellexpand::full(input)
        .map(|s| s.into_owned())
        .unwrap_or_else(|e| {
            eprintln!("blindballot: unable to expand {}: {}", input, e);
            std::process::exit(1);
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_leaves_plain_paths_alone() {
        assert_eq!(expand("./session.pem"), "./session.pem");
    }

    #[test]
    fn config_flags_override_environment() {
        let app = App::new("test").arg(
            Arg::with_name("public-key")
                .long("public-key")
                .takes_value(true),
        );
        let matches = app.get_matches_from(vec!["test", "--public-key", "./pub.pem"]);

        let config = Config {
            public_key_path: Some("./env.pem".to_owned()),
            secret_key_path: None,
        }
        .with_matches(&matches);

        assert_eq!(config.public_key_path.as_deref(), Some("./pub.pem"));
        assert_eq!(config.secret_key_path, None);
    }
}
