//! Exercises a [`Session`] through its real `Channel`-based message loop:
//! the comparison server and its client run as independent halves
//! communicating over an in-process duplex channel, unlike
//! `secomp-core`'s direct-function-call protocol simulation.

use clap::Parser;
use secomp_core::compare;
use secomp_core::crypto::HomomorphicScheme;
use secomp_core::integer::Integer;
use secomp_server::{ServerConfig, Session};
use secomp_toycrypto::{paillier_keygen, ToyPaillier};

fn config() -> ServerConfig {
    ServerConfig::parse_from(["secomp-server", "--l", "16", "--capacity", "8"])
}

async fn new_session(config: &ServerConfig) -> (Session<ToyPaillier, ToyPaillier>, secomp_toycrypto::ToyPublicKey, secomp_toycrypto::ToySecretKey) {
    let mut rng = rand::thread_rng();
    let (outer_pk, outer_sk) = paillier_keygen(256, &mut rng);
    let (dgk_pk, dgk_sk) = paillier_keygen(256, &mut rng);
    let session = Session::new(outer_pk.clone(), outer_sk.clone(), dgk_pk, dgk_sk, config, &mut rng).unwrap();
    (session, outer_pk, outer_sk)
}

#[tokio::test]
async fn scenario_table_matches_spec_over_the_real_channel() {
    let config = config();
    let (session, outer_pk, outer_sk) = new_session(&config).await;
    let mut rng = rand::thread_rng();

    let cases = [
        (0i64, 0i64, true),
        (5, 3, true),
        (3, 5, false),
        (-100, 100, false),
        (32767, -32767, true),
        (42, 42, true),
    ];

    for (a, b, expected) in cases {
        let a_ct = compare::encrypt_operand::<ToyPaillier>(&outer_pk, &Integer::from_i64(a), config.cache.l, &mut rng).unwrap();
        let b_ct = compare::encrypt_operand::<ToyPaillier>(&outer_pk, &Integer::from_i64(b), config.cache.l, &mut rng).unwrap();
        let gamma = session.compare(&a_ct, &b_ct, &mut rng).await.unwrap();
        let result = ToyPaillier::decrypt(&outer_sk, &outer_pk, &gamma).unwrap();
        assert_eq!(result.bit(0), expected, "compare({a}, {b})");
    }
}

#[tokio::test]
async fn threshold_form_compares_against_a_plaintext_bound() {
    let config = config();
    let (session, outer_pk, outer_sk) = new_session(&config).await;
    let mut rng = rand::thread_rng();

    let a_ct = compare::encrypt_operand::<ToyPaillier>(&outer_pk, &Integer::from_i64(10), config.cache.l, &mut rng).unwrap();
    let above = session
        .compare_threshold(&a_ct, &Integer::from_i64(5), &mut rng)
        .await
        .unwrap();
    let below = session
        .compare_threshold(&a_ct, &Integer::from_i64(20), &mut rng)
        .await
        .unwrap();

    assert!(ToyPaillier::decrypt(&outer_sk, &outer_pk, &above).unwrap().bit(0));
    assert!(!ToyPaillier::decrypt(&outer_sk, &outer_pk, &below).unwrap().bit(0));
}

#[tokio::test]
async fn concurrent_comparisons_on_one_session_use_strictly_increasing_counters() {
    let config = config();
    let (session, outer_pk, outer_sk) = new_session(&config).await;
    let mut rng = rand::thread_rng();

    for (a, b) in [(1i64, 2i64), (9, 4), (0, 0)] {
        let a_ct = compare::encrypt_operand::<ToyPaillier>(&outer_pk, &Integer::from_i64(a), config.cache.l, &mut rng).unwrap();
        let b_ct = compare::encrypt_operand::<ToyPaillier>(&outer_pk, &Integer::from_i64(b), config.cache.l, &mut rng).unwrap();
        let gamma = session.compare(&a_ct, &b_ct, &mut rng).await.unwrap();
        let result = ToyPaillier::decrypt(&outer_sk, &outer_pk, &gamma).unwrap();
        assert_eq!(result.bit(0), a >= b, "compare({a}, {b})");
    }
}
