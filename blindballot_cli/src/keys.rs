use crate::config::Config;
use blindballot::KeyMaterial;
use std::fs::read_to_string;

pub fn load_public_key(config: &Config, command: &str) -> KeyMaterial {
    let path = config.public_key_path.as_deref().unwrap_or_else(|| {
        eprintln!(
            "blindballot {}: provide a public key via --public-key or BLINDBALLOT_PUBLIC_KEY",
            command
        );
        std::process::exit(1);
    });

    let pem = read_to_string(path).unwrap_or_else(|e| {
        eprintln!("blindballot {}: unable to read {}: {}", command, path, e);
        std::process::exit(1);
    });

    // A signer may point voters at their private key file, only keep the public half
    match KeyMaterial::from_public_key_pem(&pem) {
        Ok(key) => key,
        Err(_) => match KeyMaterial::from_private_key_pem(&pem) {
            Ok(key) => key.to_public(),
            Err(e) => {
                eprintln!("blindballot {}: {}", command, e);
                std::process::exit(1);
            }
        },
    }
}

pub fn load_private_key(config: &Config, command: &str) -> KeyMaterial {
    let path = config.secret_key_path.as_deref().unwrap_or_else(|| {
        eprintln!(
            "blindballot {}: provide a private key via --secret or BLINDBALLOT_SECRET_KEY",
            command
        );
        std::process::exit(1);
    });

    let pem = read_to_string(path).unwrap_or_else(|e| {
        eprintln!("blindballot {}: unable to read {}: {}", command, path, e);
        std::process::exit(1);
    });

    KeyMaterial::from_private_key_pem(&pem).unwrap_or_else(|e| {
        eprintln!("blindballot {}: {}", command, e);
        std::process::exit(1);
    })
}

pub fn parse_hex_arg(
    matches: &clap::ArgMatches,
    name: &str,
    command: &str,
) -> blindballot::BigUint {
    // Unwrap is OK, all integer args are required
    let value = matches.value_of(name).unwrap();
    blindballot::hex_to_integer(value).unwrap_or_else(|e| {
        eprintln!("blindballot {}: {} is not a hex integer: {}", command, name, e);
        std::process::exit(1);
    })
}
