use he_ledger::errors::LedgerError;
use he_ledger::keypair::{KeyPair, PublicKey, SecretKey};
use he_ledger::preset::resolve;
use he_ledger::store::MemoryStore;
use he_ledger::{Ledger, LedgerConfig};

use std::sync::Once;

fn call(ledger: &Ledger, store: &mut MemoryStore, args: &[&[u8]]) -> Result<Vec<u8>, LedgerError> {
    ledger.invoke(store, args)
}

static INIT: Once = Once::new();

fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

#[test]
fn happy_flow() -> Result<(), LedgerError> {
    init_logging();

    let ledger = Ledger::init(&LedgerConfig::default())?;
    let mut store = MemoryStore::new();

    let keys = KeyPair::generate(resolve("PN13QP218")?)?;
    let pubkey = keys.public_key.encode()?;

    call(&ledger, &mut store, &[b"CreateReport", b"October", &pubkey])?;
    let vone = keys.public_key.encrypt(2000)?;
    call(&ledger, &mut store, &[b"SubmitData", b"October", b"VoneChain", &vone])?;
    let github = keys.public_key.encrypt(-1000)?;
    call(&ledger, &mut store, &[b"SubmitData", b"October", b"GitHub", &github])?;

    let sum = ledger.invoke(&mut store, &["QueryData", "October"])?;
    assert_eq!(keys.secret_key.decrypt(&sum)?, 1000);

    Ok(())
}

#[test]
fn decoded_keys_interoperate() -> Result<(), LedgerError> {
    init_logging();

    let keys = KeyPair::generate(resolve("PN12QP109")?)?;
    let secret = SecretKey::decode(&keys.secret_key.encode()?)?;
    let public = PublicKey::decode(&keys.public_key.encode()?)?;

    let ciphertext = public.encrypt(-4242)?;
    assert_eq!(keys.secret_key.decrypt(&ciphertext)?, -4242);
    assert_eq!(secret.decrypt(&keys.public_key.encrypt(77)?)?, 77);

    Ok(())
}

#[test]
fn query_result_survives_the_wire() -> Result<(), LedgerError> {
    init_logging();

    let ledger = Ledger::init(&LedgerConfig::with_profile("PN12QP109"))?;
    let mut store = MemoryStore::new();
    let keys = KeyPair::generate(ledger.manager().profile().clone())?;
    let pubkey = keys.public_key.encode()?;

    call(&ledger, &mut store, &[b"CreateReport", b"Q3", &pubkey])?;
    for (contributor, value) in [("alpha", 10), ("beta", 20), ("gamma", -5)] {
        let ciphertext = keys.public_key.encrypt(value)?;
        call(&ledger, &mut store, &[b"SubmitData", b"Q3", contributor.as_bytes(), &ciphertext])?;
    }

    let sum = ledger.invoke(&mut store, &["QueryData", "Q3"])?;
    let encoded = he_ledger::encoding::encode_unpadded(&sum)?;
    let decoded = he_ledger::encoding::decode_unpadded(&encoded)?;
    assert_eq!(keys.secret_key.decrypt(&decoded)?, 25);

    Ok(())
}
