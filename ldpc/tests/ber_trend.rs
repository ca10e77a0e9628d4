//! Seeded BPSK / AWGN simulation: the information bit-error rate should
//! fall as Eb/N0 rises.

use ldpc_spa::{CodeParams, DecoderConfig, LdpcCode};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

fn info_ber(code: &LdpcCode, ebn0_db: f64, trials: usize, rng: &mut ChaCha8Rng) -> f64 {
    let ebn0 = 10f64.powf(ebn0_db / 10.0);
    let sigma2 = 1.0 / (2.0 * code.rate() * ebn0);
    let noise = Normal::new(0.0, sigma2.sqrt()).unwrap();
    let config = DecoderConfig::default();

    let mut errors = 0usize;
    for _ in 0..trials {
        let info: Vec<u8> = (0..code.k_message_bits()).map(|_| rng.gen_range(0..2)).collect();
        let codeword = code.encode(&info).unwrap();
        let llr: Vec<f64> = codeword
            .iter()
            .map(|&bit| {
                let tx = if bit == 1 { 1.0 } else { -1.0 };
                2.0 * (tx + noise.sample(rng)) / sigma2
            })
            .collect();

        let outcome = code.decode(&llr, config).unwrap();
        errors += outcome
            .info
            .iter()
            .zip(&info)
            .filter(|(a, b)| a != b)
            .count();
    }
    errors as f64 / (trials * code.k_message_bits()) as f64
}

#[test]
fn test_ber_decreases_with_snr() {
    let params = CodeParams::new(96, 3, 6).unwrap();
    let code = LdpcCode::new(params, 2).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(20240601);

    let bers: Vec<f64> = [0.0, 2.0, 4.0]
        .iter()
        .map(|&db| info_ber(&code, db, 80, &mut rng))
        .collect();

    assert!(bers[0] > 0.0, "0 dB should still produce errors: {bers:?}");
    assert!(bers[2] < bers[0], "BER did not improve: {bers:?}");
    for pair in bers.windows(2) {
        assert!(pair[1] <= pair[0] + 0.005, "BER rose with SNR: {bers:?}");
    }
}
