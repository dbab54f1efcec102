use he_ledger::codec::CiphertextCodec;
use he_ledger::keypair::KeyPair;
use he_ledger::preset::{ParameterProfile, resolve};

use quickcheck::{QuickCheck, TestResult};
use rand::SeedableRng;
use rand::rngs::StdRng;

use std::sync::Arc;

fn profile() -> Arc<ParameterProfile> {
    resolve("PN12QP109").unwrap()
}

fn in_range(profile: &ParameterProfile, value: i64) -> i64 {
    let span = profile.max_value() as i128 - profile.min_value() as i128 + 1;
    (profile.min_value() as i128 + (value as i128).rem_euclid(span)) as i64
}

fn sum_decrypts_to_reduced_sum(a: i64, b: i64) -> TestResult {
    let profile = profile();
    let keys = KeyPair::generate_with_rng(profile.clone(), &mut StdRng::seed_from_u64(31)).unwrap();
    let codec = CiphertextCodec::new(profile.clone());

    let (a, b) = (in_range(&profile, a), in_range(&profile, b));
    let ca = codec.unmarshal(&keys.public_key.encrypt(a).unwrap()).unwrap();
    let cb = codec.unmarshal(&keys.public_key.encrypt(b).unwrap()).unwrap();

    let mut acc = ca;
    codec.combine(&mut acc, &cb);
    let decrypted = keys.secret_key.decrypt(&codec.marshal(&acc)).unwrap();

    TestResult::from_bool(decrypted == profile.reduce(a as i128 + b as i128))
}

#[test]
fn homomorphic_addition_wraps_modulo_t() {
    QuickCheck::new()
        .tests(16)
        .quickcheck(sum_decrypts_to_reduced_sum as fn(i64, i64) -> TestResult);
}

#[test]
fn sum_of_extremes_wraps() {
    let profile = profile();
    let keys = KeyPair::generate_with_rng(profile.clone(), &mut StdRng::seed_from_u64(32)).unwrap();
    let codec = CiphertextCodec::new(profile.clone());

    let max = profile.max_value();
    let ciphertexts = [max, max]
        .iter()
        .map(|&v| codec.unmarshal(&keys.public_key.encrypt(v).unwrap()).unwrap())
        .collect::<Vec<_>>();

    let sum = codec.sum(&ciphertexts).unwrap();
    let decrypted = keys.secret_key.decrypt(&codec.marshal(&sum)).unwrap();
    assert_eq!(decrypted, profile.reduce(2 * max as i128));
}
