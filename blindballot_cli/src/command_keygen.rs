use blindballot::KeyMaterial;
use std::fs::File;
use std::io::prelude::*;

pub fn command_keygen(matches: &clap::ArgMatches) {
    // Unwraps are OK, both these args are required
    let secret_location = crate::expand(matches.value_of("secret").unwrap());
    let bits: usize = matches
        .value_of("bits")
        .unwrap()
        .parse()
        .unwrap_or_else(|e| {
            eprintln!("blindballot keygen: invalid bits: {}", e);
            std::process::exit(1);
        });

    // Undersized keys are refused or logged at warn level by the library
    let mut rng = rand::rngs::OsRng;
    let generated = KeyMaterial::generate(&mut rng, bits).unwrap_or_else(|e| {
        eprintln!("blindballot keygen: {}", e);
        std::process::exit(1);
    });

    let mut file = File::create(&secret_location).unwrap_or_else(|e| {
        eprintln!(
            "blindballot keygen: cannot create file {}: {}",
            &secret_location, e
        );
        std::process::exit(1);
    });

    file.write_all(generated.private_pem.as_bytes())
        .unwrap_or_else(|e| {
            eprintln!(
                "blindballot keygen: unable to write secret to {}: {}",
                &secret_location, e
            );
            std::process::exit(1);
        });

    print!("{}", generated.public_pem);
}
