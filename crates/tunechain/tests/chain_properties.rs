use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tunechain::{Catalogue, Error, InitialEstimate, MarkovChain, State};

const EPS: f64 = 1e-9;

fn st(pitch: &str, duration: f64) -> State {
    State::new(pitch, duration).unwrap()
}

fn scale_catalogue() -> Catalogue {
    Catalogue::new(vec![
        st("C4", 1.0),
        st("D4", 1.0),
        st("E4", 0.5),
        st("F4", 0.5),
        st("G4", 2.0),
        st("A4", 1.0),
    ])
    .unwrap()
}

fn training_melody() -> Vec<State> {
    vec![
        st("C4", 1.0),
        st("D4", 1.0),
        st("E4", 0.5),
        st("F4", 0.5),
        st("E4", 0.5),
        st("D4", 1.0),
        st("C4", 1.0),
        st("E4", 0.5),
        st("G4", 2.0),
    ]
}

#[test]
fn initial_distribution_sums_to_one() {
    let mut chain = MarkovChain::seeded(scale_catalogue(), 1);
    chain.train(&training_melody()).unwrap();

    let total: f64 = chain.initial_distribution().unwrap().iter().sum();
    assert!((total - 1.0).abs() < EPS, "initial sums to {total}");
}

#[test]
fn transition_rows_sum_to_one_or_zero() {
    let mut chain = MarkovChain::seeded(scale_catalogue(), 1);
    chain.train(&training_melody()).unwrap();
    let matrix = chain.transition_matrix().unwrap();

    for (i, row) in matrix.rows().enumerate() {
        let sum: f64 = row.iter().sum();
        assert!(row.iter().all(|p| p.is_finite() && *p >= 0.0));
        if i == 4 || i == 5 {
            // G4 only ends the melody, A4 never appears
            assert_eq!(sum, 0.0, "row {i} should be absorbing");
        } else {
            assert!((sum - 1.0).abs() < EPS, "row {i} sums to {sum}");
        }
    }
}

#[test]
fn generate_returns_requested_length() {
    let mut chain = MarkovChain::seeded(scale_catalogue(), 5);
    chain.train(&training_melody()).unwrap();

    assert!(chain.generate(0).unwrap().is_empty());
    for n in [1, 2, 17, 250] {
        assert_eq!(chain.generate(n).unwrap().len(), n);
    }
}

#[test]
fn generated_states_come_from_the_catalogue() {
    let mut chain = MarkovChain::seeded(scale_catalogue(), 11);
    chain.train(&training_melody()).unwrap();
    let melody = chain.generate(500).unwrap();
    // A4 was never observed, so it has zero starting weight and no
    // incoming transitions
    assert!(melody.iter().all(|s| chain.catalogue().contains(s)));
    assert!(!melody.contains(&st("A4", 1.0)));
}

#[test]
fn alternating_example_from_sequence_start() {
    let a = st("A", 1.0);
    let b = st("B", 1.0);
    let catalogue = Catalogue::new(vec![a.clone(), b.clone()]).unwrap();
    let mut chain =
        MarkovChain::seeded(catalogue, 2024).with_initial_estimate(InitialEstimate::SequenceStart);
    chain.train(&[a.clone(), b.clone(), a.clone(), b.clone()]).unwrap();

    assert_eq!(chain.initial_distribution().unwrap(), &[1.0, 0.0]);
    let matrix = chain.transition_matrix().unwrap();
    assert_eq!(matrix.row(0).unwrap(), &[0.0, 1.0]);
    assert_eq!(matrix.row(1).unwrap(), &[1.0, 0.0]);

    let melody = chain.generate(7).unwrap();
    assert_eq!(
        melody,
        vec![a.clone(), b.clone(), a.clone(), b.clone(), a.clone(), b.clone(), a]
    );
}

#[test]
fn alternating_example_under_frequency_estimate_still_alternates() {
    let a = st("A", 1.0);
    let b = st("B", 1.0);
    let catalogue = Catalogue::new(vec![a.clone(), b.clone()]).unwrap();
    let mut chain = MarkovChain::seeded(catalogue, 3);
    chain.train(&[a.clone(), b.clone(), a.clone(), b.clone()]).unwrap();

    let melody = chain.generate(20).unwrap();
    for pair in melody.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
}

#[test]
fn same_seed_same_melody() {
    let mut first = MarkovChain::seeded(scale_catalogue(), 99);
    let mut second = MarkovChain::seeded(scale_catalogue(), 99);
    first.train(&training_melody()).unwrap();
    second.train(&training_melody()).unwrap();

    assert_eq!(first.generate(64).unwrap(), second.generate(64).unwrap());
}

#[test]
fn injected_rng_is_used() {
    let mut chain = MarkovChain::new(scale_catalogue(), StdRng::seed_from_u64(99));
    let mut seeded = MarkovChain::seeded(scale_catalogue(), 99);
    chain.train(&training_melody()).unwrap();
    seeded.train(&training_melody()).unwrap();

    assert_eq!(chain.generate(32).unwrap(), seeded.generate(32).unwrap());
}

#[test]
fn absorbing_state_restarts_from_initial_distribution() {
    let c = st("C4", 1.0);
    let g = st("G4", 1.0);
    let catalogue = Catalogue::new(vec![c.clone(), g.clone()]).unwrap();
    let mut chain = MarkovChain::seeded(catalogue, 17);
    // G4 ends the melody and is never followed
    chain.train(&[c.clone(), c.clone(), g.clone()]).unwrap();

    assert!(!chain.has_successor(&g).unwrap());
    let initial = chain.initial_distribution().unwrap().to_vec();
    let n = 6_000;
    let mut c_count = 0;
    for _ in 0..n {
        let next = chain.generate_next(&g).unwrap();
        if next == c {
            c_count += 1;
        }
    }
    let pct = c_count as f64 / n as f64;
    assert!(
        (pct - initial[0]).abs() < 0.03,
        "fallback picked C4 {:.3}, initial weight {:.3}",
        pct,
        initial[0]
    );
}

#[test]
fn unknown_symbol_never_advances_state() {
    let mut chain = MarkovChain::seeded(scale_catalogue(), 4);
    chain.train(&training_melody()).unwrap();
    let initial = chain.initial_distribution().unwrap().to_vec();
    let matrix = chain.transition_matrix().unwrap().clone();

    let stranger = st("B7", 0.125);
    assert_eq!(
        chain.generate_next(&stranger),
        Err(Error::UnknownSymbol {
            symbol: "B7/0.125".into()
        })
    );
    let mut bad = training_melody();
    bad.push(stranger);
    assert!(matches!(chain.train(&bad), Err(Error::UnknownSymbol { .. })));

    assert_eq!(chain.initial_distribution().unwrap(), initial.as_slice());
    assert_eq!(chain.transition_matrix().unwrap(), &matrix);
}

#[test]
fn retraining_replaces_prior_distributions() {
    let s = training_melody();
    let t = vec![st("A4", 1.0), st("C4", 1.0), st("A4", 1.0), st("D4", 1.0)];

    let mut twice = MarkovChain::seeded(scale_catalogue(), 8);
    twice.train(&s).unwrap();
    twice.train(&t).unwrap();

    let mut once = MarkovChain::seeded(scale_catalogue(), 8);
    once.train(&t).unwrap();

    assert_eq!(twice.initial_distribution(), once.initial_distribution());
    assert_eq!(twice.transition_matrix(), once.transition_matrix());
    assert_eq!(twice.generate(40).unwrap(), once.generate(40).unwrap());
}

#[test]
fn walk_matches_generate() {
    let mut walked = MarkovChain::seeded(scale_catalogue(), 21);
    let mut generated = MarkovChain::seeded(scale_catalogue(), 21);
    walked.train(&training_melody()).unwrap();
    generated.train(&training_melody()).unwrap();

    let from_walk: Vec<State> = walked.walk().take(30).collect::<Result<_, _>>().unwrap();
    assert_eq!(from_walk, generated.generate(30).unwrap());
}
