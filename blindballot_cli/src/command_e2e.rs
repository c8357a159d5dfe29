use blindballot::*;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use uuid::Uuid;

/// Run a complete vote session in memory and print each step
pub fn command_e2e(matches: &clap::ArgMatches) {
    let bits: usize = matches
        .value_of("bits")
        .unwrap()
        .parse()
        .unwrap_or_else(|e| {
            eprintln!("blindballot e2e: invalid bits: {}", e);
            std::process::exit(1);
        });
    let candidates: Vec<&str> = matches.values_of("CANDIDATES").unwrap().collect();

    if let Err(e) = run(bits, &candidates) {
        eprintln!("blindballot e2e: {}", e);
        std::process::exit(1);
    }
}

fn run(bits: usize, candidates: &[&str]) -> Result<(), FlowError> {
    let mut rng = rand::rngs::OsRng;
    let now = SystemTime::now();

    let signer = Uuid::new_v4();
    let mut sessions = MemSessionDirectory::default();
    let session_id =
        sessions.create_session(&mut rng, now + Duration::from_secs(3600), signer, bits)?;
    let sessions = Arc::new(sessions);
    println!("> Created vote session {} ({} bit key)", session_id, bits);

    let voters: Vec<Uuid> = candidates.iter().map(|_| Uuid::new_v4()).collect();
    let mut users = MemUserDirectory::default();
    for voter in &voters {
        users.allow(*voter, session_id);
    }

    let issuer = CredentialIssuer::new(sessions.clone(), users, MemRedemptionKeyStore::new());
    let ledger = Arc::new(MemVoteLedger::new());
    let redemption = VoteRedemption::new(
        sessions.clone(),
        ledger.clone(),
        Arc::new(KeyCache::new()),
    );
    let public_key = sessions.get_public_key(session_id)?;

    for (voter, candidate) in voters.iter().zip(candidates) {
        let key = issuer.issue(*voter, session_id, now)?;
        println!("> Issued voting key to {}", voter);

        let token = CandidateToken::new(&mut rng, candidate).to_bytes();
        let blinded = blind(&mut rng, &token, &public_key)?;
        println!("  blinded:   {}", integer_to_hex(&blinded.blinded_value));

        let blind_signature = issuer.sign_blinded(signer, &key, &blinded.blinded_value, now)?;
        println!("  signed:    {}", integer_to_hex(&blind_signature));

        let signature = unblind(&blind_signature, blinded.blinding_factor(), &public_key)?;
        println!("  unblinded: {}", integer_to_hex(&signature));

        redemption.cast_vote(&signature, &token, session_id)?;
        println!("  vote cast for {}", candidate);
    }

    println!("> Session verified OK");
    println!("Votes:");
    for vote in ledger.votes(session_id) {
        println!("  {}", vote);
    }

    Ok(())
}
