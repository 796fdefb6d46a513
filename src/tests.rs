use super::*;
use crate::arithmetic::{g1_size, scalar_size};
use ark_bls12_381::{Bls12_381, Fr, G1Affine};
use ark_ec::AffineRepr;
use ark_ff::{One, UniformRand};
use ark_std::test_rng;
use merlin::Transcript;
use proptest::prelude::*;
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

type Pcs = MultilinearKzgPcs<Bls12_381>;

fn random_point<R: rand::RngCore>(nv: usize, rng: &mut R) -> Vec<Fr> {
    (0..nv).map(|_| Fr::rand(rng)).collect()
}

fn boolean_point(index: usize, nv: usize) -> Vec<Fr> {
    (0..nv).map(|j| Fr::from(((index >> j) & 1) as u64)).collect()
}

#[test]
fn test_completeness_across_sizes() {
    let mut rng = test_rng();
    let params = UniversalParams::<Bls12_381>::gen_srs_for_testing(&mut rng, 8).unwrap();
    for nv in 1..=8 {
        let (pp, vp) = params.trim(nv).unwrap();
        let poly = MultilinearPolynomial::rand(nv, &mut rng);
        let point = random_point(nv, &mut rng);

        let (commitment, proof, value) = commit_and_open(&pp, &poly, &point).unwrap();
        assert!(Pcs::verify(&vp, &commitment, &point, &value, &proof).unwrap());
    }
}

#[test]
fn test_opening_at_boolean_point_returns_table_entry() {
    let mut rng = test_rng();
    let params = UniversalParams::<Bls12_381>::gen_srs_for_testing(&mut rng, 4).unwrap();
    let (pp, vp) = params.trim(4).unwrap();
    let poly = MultilinearPolynomial::rand(4, &mut rng);
    let commitment = Pcs::commit(&pp, &poly).unwrap();

    for index in [0usize, 5, 15] {
        let point = boolean_point(index, 4);
        let (proof, value) = Pcs::open(&pp, &poly, &point).unwrap();
        assert_eq!(value, poly.evaluations()[index]);
        assert!(Pcs::verify(&vp, &commitment, &point, &value, &proof).unwrap());
    }
}

#[test]
fn test_single_byte_mutation_is_rejected() {
    let mut rng = test_rng();
    let nv = 3;
    let params = UniversalParams::<Bls12_381>::gen_srs_for_testing(&mut rng, nv).unwrap();
    let (pp, vp) = params.trim(nv).unwrap();
    let poly = MultilinearPolynomial::rand(nv, &mut rng);
    let point = random_point(nv, &mut rng);
    let (commitment, proof, _) = commit_and_open(&pp, &poly, &point).unwrap();
    let bytes = proof.to_bytes().unwrap();

    for position in 0..bytes.len() {
        let mut mutated = bytes.clone();
        mutated[position] ^= 0x01;
        // Either the bytes no longer decode or the decoded proof is rejected.
        if let Ok(decoded) = OpeningProof::<Bls12_381>::from_bytes(&mutated, nv) {
            let accepted = Pcs::verify(&vp, &commitment, &point, &decoded.evaluation, &decoded)
                .unwrap();
            assert!(!accepted, "mutation at byte {} was accepted", position);
        }
    }
}

#[test]
fn test_substituted_evaluation_is_rejected() {
    let mut rng = test_rng();
    let params = UniversalParams::<Bls12_381>::gen_srs_for_testing(&mut rng, 5).unwrap();
    let (pp, vp) = params.trim(5).unwrap();
    let poly = MultilinearPolynomial::rand(5, &mut rng);
    let point = random_point(5, &mut rng);
    let (commitment, mut proof, value) = commit_and_open(&pp, &poly, &point).unwrap();

    for _ in 0..4 {
        let other = Fr::rand(&mut rng);
        assert!(!Pcs::verify(&vp, &commitment, &point, &other, &proof).unwrap());
    }
    proof.evaluation = value + Fr::one();
    assert!(!Pcs::verify(&vp, &commitment, &point, &proof.evaluation, &proof).unwrap());
}

#[test]
fn test_commit_is_deterministic() {
    let mut rng = test_rng();
    let params = UniversalParams::<Bls12_381>::gen_srs_for_testing(&mut rng, 6).unwrap();
    let (pp, _) = params.trim(6).unwrap();
    let poly = MultilinearPolynomial::rand(6, &mut rng);

    let first = Pcs::commit(&pp, &poly).unwrap().to_bytes().unwrap();
    let second = Pcs::commit(&pp, &poly).unwrap().to_bytes().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_results_do_not_depend_on_thread_count() {
    let mut rng = test_rng();
    let nv = 12;
    let params = UniversalParams::<Bls12_381>::from_seed(11, nv).unwrap();
    let (pp, _) = params.trim(nv).unwrap();
    let poly = MultilinearPolynomial::rand(nv, &mut rng);
    let point = random_point(nv, &mut rng);

    let run = |threads: usize| {
        PcsConfig::default()
            .with_num_threads(threads)
            .install(|| commit_and_open(&pp, &poly, &point))
            .unwrap()
            .unwrap()
    };
    let single = run(1);
    let multi = run(4);
    assert_eq!(single.0, multi.0);
    assert_eq!(single.1, multi.1);
    assert_eq!(single.2, multi.2);
}

#[test]
fn test_proof_size_law() {
    let expected = |nv: usize| nv * g1_size::<Bls12_381>() + scalar_size::<Bls12_381>();
    assert_eq!(expected(1), 48 + 32);

    for nv in [1usize, 4, 8, 15, 20] {
        let proof = OpeningProof::<Bls12_381> {
            evaluation: Fr::from(nv as u64),
            proofs: vec![G1Affine::generator(); nv],
        };
        let bytes = proof.to_bytes().unwrap();
        assert_eq!(bytes.len(), expected(nv));
        assert_eq!(OpeningProof::<Bls12_381>::serialized_size(nv), expected(nv));
        assert_eq!(OpeningProof::<Bls12_381>::from_bytes(&bytes, nv).unwrap(), proof);
    }

    let mut rng = test_rng();
    let params = UniversalParams::<Bls12_381>::gen_srs_for_testing(&mut rng, 8).unwrap();
    for nv in [1usize, 4, 8] {
        let (pp, _) = params.trim(nv).unwrap();
        let poly = MultilinearPolynomial::rand(nv, &mut rng);
        let (proof, _) = Pcs::open(&pp, &poly, &random_point(nv, &mut rng)).unwrap();
        assert_eq!(proof.to_bytes().unwrap().len(), expected(nv));
    }
}

#[test]
fn test_boolean_evaluations_match_table_exhaustively() {
    let mut rng = test_rng();
    for nv in 0..=10 {
        let poly = MultilinearPolynomial::<Fr>::rand(nv, &mut rng);
        for index in 0..1usize << nv {
            assert_eq!(
                poly.evaluate(&boolean_point(index, nv)).unwrap(),
                poly.evaluations()[index],
                "nv = {}, index = {}",
                nv,
                index
            );
        }
    }
}

#[test]
fn test_trimmed_params_do_not_mix() {
    let mut rng = test_rng();
    let params = UniversalParams::<Bls12_381>::gen_srs_for_testing(&mut rng, 6).unwrap();
    let (pp3, vp3) = params.trim(3).unwrap();
    let (_, vp4) = params.trim(4).unwrap();
    let poly = MultilinearPolynomial::rand(3, &mut rng);
    let point = random_point(3, &mut rng);
    let (commitment, proof, value) = commit_and_open(&pp3, &poly, &point).unwrap();

    assert!(Pcs::verify(&vp3, &commitment, &point, &value, &proof).unwrap());
    assert!(Pcs::verify(&vp4, &commitment, &point, &value, &proof).is_err());
}

#[test]
fn test_persisted_params_verify_fresh_proofs() {
    let mut rng = test_rng();
    let params = UniversalParams::<Bls12_381>::gen_srs_for_testing(&mut rng, 4).unwrap();
    let mut stored = Vec::new();
    params.write(&mut stored).unwrap();

    let (pp, _) = params.trim(4).unwrap();
    let poly = MultilinearPolynomial::rand(4, &mut rng);
    let point = random_point(4, &mut rng);
    let (commitment, proof, value) = commit_and_open(&pp, &poly, &point).unwrap();

    let loaded = UniversalParams::<Bls12_381>::read(&stored[..]).unwrap();
    let (_, vp) = loaded.trim(4).unwrap();
    assert!(Pcs::verify(&vp, &commitment, &point, &value, &proof).unwrap());
}

#[test]
fn test_setup_from_config() {
    let config = PcsConfig::default().with_num_threads(2).with_srs_seed(99);
    let (pp, vp) = setup_pcs::<Bls12_381>(&config, 3).unwrap();
    let (pp_again, vp_again) = setup_pcs::<Bls12_381>(&config, 3).unwrap();
    assert_eq!(pp, pp_again);
    assert_eq!(vp, vp_again);

    let mut rng = test_rng();
    let poly = MultilinearPolynomial::rand(3, &mut rng);
    let point = random_point(3, &mut rng);
    let (commitment, proof, value) = commit_and_open(&pp, &poly, &point).unwrap();
    assert!(Pcs::verify(&vp, &commitment, &point, &value, &proof).unwrap());
}

#[test]
fn test_three_commitments_one_batched_opening() {
    let mut rng = test_rng();
    let params = UniversalParams::<Bls12_381>::gen_srs_for_testing(&mut rng, 5).unwrap();
    let (pp, vp) = params.trim(5).unwrap();
    let witnesses: Vec<_> = (0..3)
        .map(|_| MultilinearPolynomial::rand(5, &mut rng))
        .collect();
    let commitments = Pcs::multi_commit(&pp, &witnesses).unwrap();
    assert_eq!(commitments.len(), 3);

    let point = random_point(5, &mut rng);
    let mut transcript = Transcript::new(b"piop");
    let batch = Pcs::batch_open(&pp, &witnesses, &commitments, &point, &mut transcript).unwrap();

    let mut transcript = Transcript::new(b"piop");
    assert!(Pcs::batch_verify(&vp, &commitments, &point, &batch, &mut transcript).unwrap());

    // A verifier on a different transcript draws a different challenge.
    let mut transcript = Transcript::new(b"other");
    assert!(!Pcs::batch_verify(&vp, &commitments, &point, &batch, &mut transcript).unwrap());
}

#[test]
fn test_zero_polynomial_commits_to_identity() {
    let params = UniversalParams::<Bls12_381>::from_seed(2, 3).unwrap();
    let (pp, _) = params.trim(3).unwrap();
    let commitment = Pcs::commit(&pp, &MultilinearPolynomial::zero(3)).unwrap();
    assert!(commitment.0.is_zero());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn prop_completeness(seed in any::<u64>(), nv in 0usize..=5) {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let params = UniversalParams::<Bls12_381>::gen_srs_for_testing(&mut rng, nv).unwrap();
        let (pp, vp) = params.trim(nv).unwrap();
        let poly = MultilinearPolynomial::rand(nv, &mut rng);
        let point = random_point(nv, &mut rng);

        let (commitment, proof, value) = commit_and_open(&pp, &poly, &point).unwrap();
        prop_assert_eq!(value, poly.evaluate(&point).unwrap());
        prop_assert!(Pcs::verify(&vp, &commitment, &point, &value, &proof).unwrap());
    }

    #[test]
    fn prop_evaluation_is_linear(seed in any::<u64>(), nv in 0usize..=6) {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let a = MultilinearPolynomial::<Fr>::rand(nv, &mut rng);
        let b = MultilinearPolynomial::<Fr>::rand(nv, &mut rng);
        let c = Fr::rand(&mut rng);
        let point = random_point(nv, &mut rng);

        let combined = MultilinearPolynomial::linear_combination(
            &[a.clone(), b.clone()],
            &[Fr::one(), c],
        ).unwrap();
        prop_assert_eq!(
            combined.evaluate(&point).unwrap(),
            a.evaluate(&point).unwrap() + c * b.evaluate(&point).unwrap()
        );
    }
}
