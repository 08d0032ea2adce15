mod common;

use plinth_cache::{BuildCache, DirBackend};
use plinth_codec::Value;
use plinth_compiler::{build, BuildOptions, CallArgs, Compiler, Purpose, Validator, ValidatorSet};
use plinth_schema::{Primitive, TypeSchema};
use tempfile::TempDir;

use common::FakeToolchain;

fn int() -> TypeSchema {
    TypeSchema::primitive(Primitive::Int)
}

fn pair(order: &[&str], payout_source: &str) -> ValidatorSet {
    let mut set = ValidatorSet::new();
    for name in order {
        match *name {
            "payout" => set.insert(
                Validator::new("payout", Purpose::Spending, payout_source, int())
                    .with_datum(int())
                    .with_hash_dependency("policy"),
            ),
            _ => set.insert(Validator::new(
                "policy",
                Purpose::Minting,
                "func shared::fee",
                int(),
            )),
        };
    }
    set
}

const PAYOUT: &str = "hash policy\nfunc shared::fee";

#[test]
fn rebuild_is_served_from_cache() {
    let toolchain = FakeToolchain::new();
    let set = pair(&["payout", "policy"], PAYOUT);
    let options = BuildOptions::default();
    let mut cache = BuildCache::in_memory();

    let first = build(&toolchain, &set, &options, Some(&mut cache)).unwrap();
    let compiles = toolchain.compiles();
    assert_eq!(compiles, 4);

    let second = build(&toolchain, &set, &options, Some(&mut cache)).unwrap();
    assert!(second.from_cache);
    assert_eq!(toolchain.compiles(), compiles);
    assert_eq!(second.cache_key, first.cache_key);
    for (name, v) in &first.validators {
        let restored = second.validator(name).unwrap();
        assert_eq!(restored.hash, v.hash);
        assert_eq!(restored.purpose, v.purpose);
        assert_eq!(restored.dependencies, v.dependencies);
        assert_eq!(
            restored.programs.optimized.to_bytes(),
            v.programs.optimized.to_bytes()
        );
    }
    assert_eq!(
        second.user_funcs.keys().collect::<Vec<_>>(),
        first.user_funcs.keys().collect::<Vec<_>>()
    );
}

#[test]
fn cache_key_ignores_declaration_order() {
    let toolchain = FakeToolchain::new();
    let options = BuildOptions::default();
    let one = pair(&["payout", "policy"], PAYOUT);
    let two = pair(&["policy", "payout"], PAYOUT);
    assert_eq!(
        Compiler::new(&toolchain, &one, &options).cache_key().unwrap(),
        Compiler::new(&toolchain, &two, &options).cache_key().unwrap()
    );
}

#[test]
fn one_character_change_misses_the_cache() {
    let toolchain = FakeToolchain::new();
    let options = BuildOptions::default();
    let mut cache = BuildCache::in_memory();

    build(&toolchain, &pair(&["payout", "policy"], PAYOUT), &options, Some(&mut cache)).unwrap();
    let compiles = toolchain.compiles();

    let edited = pair(&["payout", "policy"], "hash policy\nfunc shared::fee!");
    let bundle = build(&toolchain, &edited, &options, Some(&mut cache)).unwrap();
    assert!(!bundle.from_cache);
    assert!(toolchain.compiles() > compiles);
}

#[test]
fn directory_cache_survives_a_new_session() {
    let dir = TempDir::new().unwrap();
    let set = pair(&["payout", "policy"], PAYOUT);
    let options = BuildOptions::default();

    let first = {
        let toolchain = FakeToolchain::new();
        let mut cache = BuildCache::new(Box::new(DirBackend::new(dir.path())));
        build(&toolchain, &set, &options, Some(&mut cache)).unwrap()
    };

    let toolchain = FakeToolchain::new();
    let mut cache = BuildCache::new(Box::new(DirBackend::new(dir.path())));
    assert!(cache.contains(&first.cache_key));
    let restored = build(&toolchain, &set, &options, Some(&mut cache)).unwrap();

    assert!(restored.from_cache);
    assert_eq!(toolchain.compiles(), 0);
    // Two validators and one user function, each an optimized and an unoptimized program.
    assert_eq!(toolchain.loads(), 6);
    assert_eq!(
        restored.validator("payout").unwrap().hash,
        first.validator("payout").unwrap().hash
    );

    let fee = restored.user_func("shared::fee").unwrap();
    let result = fee
        .call(CallArgs::new().arg("amount", 7i64).current_validator("policy"))
        .unwrap();
    assert_eq!(result, Value::Int(7));
}

#[test]
fn expected_hash_is_checked_on_cache_hit() {
    let toolchain = FakeToolchain::new();
    let set = pair(&["payout", "policy"], PAYOUT);
    let mut cache = BuildCache::in_memory();
    build(&toolchain, &set, &BuildOptions::default(), Some(&mut cache)).unwrap();

    // Expected hashes are not part of the cache key.
    let options = BuildOptions {
        expected_hashes: [("policy".to_string(), vec![0; 28])].into(),
        ..BuildOptions::default()
    };
    let err = build(&toolchain, &set, &options, Some(&mut cache)).unwrap_err();
    assert!(err.to_string().contains("policy"));
}

#[test]
fn positional_cache_replays_in_order() {
    let toolchain = FakeToolchain::new();
    let options = BuildOptions::default();
    let first_set = pair(&["payout", "policy"], PAYOUT);
    let second_set = pair(&["payout", "policy"], "hash policy\nother body");
    let mut cache = BuildCache::positional();

    let first = build(&toolchain, &first_set, &options, Some(&mut cache)).unwrap();
    let second = build(&toolchain, &second_set, &options, Some(&mut cache)).unwrap();
    assert_eq!(cache.positional_len(), 2);
    let compiles = toolchain.compiles();

    cache.rewind();
    let replay_first = build(&toolchain, &first_set, &options, Some(&mut cache)).unwrap();
    let replay_second = build(&toolchain, &second_set, &options, Some(&mut cache)).unwrap();
    assert_eq!(toolchain.compiles(), compiles);
    assert!(replay_first.from_cache && replay_second.from_cache);
    assert_eq!(
        replay_first.validator("payout").unwrap().hash,
        first.validator("payout").unwrap().hash
    );
    assert_eq!(
        replay_second.validator("payout").unwrap().hash,
        second.validator("payout").unwrap().hash
    );
}
