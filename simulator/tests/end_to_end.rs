//! Catalog-to-frames scenarios across the public API

mod common;

use std::time::Duration;

use approx::assert_relative_eq;
use common::*;
use simulator::catalog::RawSource;
use simulator::sims::ConstantBackground;
use simulator::units::{LengthExt, Wavelength};
use simulator::{
    synthesize_sky_images, CancelToken, DetectorError, GaussianPrf, SimulationConfig,
    SynthesisError, SynthesisParams,
};

fn quiet_params(seed: u64) -> SynthesisParams {
    SynthesisParams {
        nreads: 2,
        nt: 3,
        jitter_x_3sigma_px: 1.5,
        jitter_y_3sigma_px: 0.8,
        jitter_timescale: Duration::from_millis(500),
        include_noise: false,
        seed,
        ..Default::default()
    }
}

fn prf() -> GaussianPrf {
    GaussianPrf::from_fwhm(2.4).unwrap()
}

#[test]
fn frame_count_follows_nt_not_nreads() {
    init_logging();
    let vis = small_visda(96, 96);
    let catalog = resolve(&vis, small_field());
    let background = ConstantBackground::new(0.0);

    for nreads in [1, 4, 7] {
        let params = SynthesisParams {
            nreads,
            ..quiet_params(1)
        };
        let images =
            synthesize_sky_images(&catalog, &vis, &prf(), &background, &params, None).unwrap();
        assert_eq!(images.frames.dim(), (3, 96, 96));
        assert_eq!(images.jitter.len(), 3 * nreads);
    }
}

#[test]
fn noise_free_runs_repeat_for_any_thread_count() {
    let vis = small_visda(128, 128);
    let catalog = resolve(&vis, small_field());
    let background = ConstantBackground::new(0.0);

    let run = |threads: usize, seed: u64| {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap();
        pool.install(|| {
            synthesize_sky_images(&catalog, &vis, &prf(), &background, &quiet_params(seed), None)
                .unwrap()
        })
    };

    let single = run(1, 21);
    let many = run(4, 21);
    assert_eq!(single, many);
    assert!(single.frames.sum() > 0.0);

    let other = run(4, 22);
    assert_ne!(single.frames, other.frames);
}

#[test]
fn resolver_keeps_only_finite_rows() {
    let vis = small_visda(128, 128);
    let mut rows = small_field();
    let valid = rows.len();
    rows.extend([
        RawSource::new(f64::NAN, TARGET_DEC, 10.0),
        RawSource::new(TARGET_RA, f64::INFINITY, 10.0),
        RawSource::new(TARGET_RA, TARGET_DEC, f64::NAN),
    ]);

    let catalog = resolve(&vis, rows);
    assert_eq!(catalog.len(), valid);
    assert!(catalog
        .rows
        .iter()
        .all(|r| r.ra.is_finite() && r.dec.is_finite() && r.mag.is_finite()));
}

#[test]
fn magnitude_round_trip_on_both_detectors() {
    let obs = observatory();
    for detector in [&obs.visda, &obs.nirda] {
        for i in 0..=50 {
            let mag = -5.0 + 0.5 * i as f64;
            let flux = detector.flux_from_magnitude(mag).unwrap();
            assert_relative_eq!(
                detector.magnitude_from_flux(flux).unwrap(),
                mag,
                epsilon = 1e-9
            );
        }
    }
}

#[test]
fn response_curves_are_non_negative() {
    let obs = observatory();
    for detector in [&obs.visda, &obs.nirda] {
        for i in 0..=580 {
            let wl = Wavelength::from_micrometers(0.1 + 0.005 * i as f64);
            let throughput = detector.throughput(wl);
            assert!((0.0..=1.0).contains(&throughput), "{throughput} at {i}");
            assert!(detector.quantum_efficiency(wl) >= 0.0);
            assert!(detector.sensitivity(wl) >= 0.0);
        }
    }
}

#[test]
fn nir_quantum_efficiency_rolls_off_past_the_cutoffs() {
    let obs = observatory();
    let qe = |um: f64| obs.nirda.quantum_efficiency(Wavelength::from_micrometers(um));

    let red: Vec<f64> = (0..20).map(|i| qe(1.69 + 0.005 * i as f64)).collect();
    assert!(red.windows(2).all(|w| w[1] <= w[0]));
    let blue: Vec<f64> = (0..20).map(|i| qe(0.75 - 0.005 * i as f64)).collect();
    assert!(blue.windows(2).all(|w| w[1] <= w[0]));

    assert_eq!(qe(2.5), 0.0);
    assert_eq!(qe(0.3), 0.0);
}

#[test]
fn centred_star_delivers_expected_electrons() {
    init_logging();
    let vis = small_visda(64, 64);
    let catalog = resolve(&vis, vec![RawSource::new(TARGET_RA, TARGET_DEC, 10.0)]);
    let row = catalog.rows[0];
    assert_relative_eq!(row.vis_x, 32.0, epsilon = 1e-6);
    assert_relative_eq!(row.vis_y, 32.0, epsilon = 1e-6);

    let band = vis.integrated_sensitivity(
        Wavelength::from_nanometers(100.0),
        Wavelength::from_nanometers(1000.0),
    );
    let read_time = vis.integration_time().unwrap().as_secs_f64();
    let expected = vis.flux_from_magnitude(10.0).unwrap() * band * read_time;
    assert!(expected > 1e3, "expected {expected}");

    let background = ConstantBackground::new(0.0);
    for seed in 0..4 {
        let params = SynthesisParams {
            nreads: 1,
            nt: 1,
            jitter_x_3sigma_px: 0.0,
            jitter_y_3sigma_px: 0.0,
            include_noise: false,
            seed,
            ..Default::default()
        };
        let images =
            synthesize_sky_images(&catalog, &vis, &prf(), &background, &params, None).unwrap();
        let total = images.frames.sum();
        // Five Poisson standard deviations
        let tolerance = 5.0 * expected.sqrt();
        assert!(
            (total - expected).abs() < tolerance,
            "seed {seed}: {total} vs {expected}"
        );
        assert!(images.frames[[0, 32, 32]] > images.frames[[0, 32, 36]]);
    }
}

#[test]
fn noise_needs_a_characterised_detector() {
    let obs = observatory();
    let catalog = resolve(&obs.visda, small_field());
    let params = SynthesisParams {
        nt: 1,
        nreads: 1,
        include_noise: true,
        ..Default::default()
    };
    let result = synthesize_sky_images(
        &catalog,
        &obs.nirda,
        &prf(),
        &ConstantBackground::new(1.0),
        &params,
        None,
    );
    assert!(matches!(
        result,
        Err(SynthesisError::Detector(DetectorError::NotConfigured { .. }))
    ));
}

#[test]
fn cancelled_runs_stop_early() {
    let vis = small_visda(64, 64);
    let catalog = resolve(&vis, small_field());
    let token = CancelToken::new();
    token.cancel();

    let result = synthesize_sky_images(
        &catalog,
        &vis,
        &prf(),
        &ConstantBackground::new(0.0),
        &quiet_params(3),
        Some(&token),
    );
    assert!(matches!(result, Err(SynthesisError::Cancelled)));
}

#[test]
fn configured_noisy_run_masks_the_field_stop() {
    init_logging();
    let config = SimulationConfig::from_json_str(
        r#"{
            "nreads": 2,
            "nt": 1,
            "jitter_x": "0.5 pix",
            "jitter_y": "0.5 pix",
            "seed": 17
        }"#,
    )
    .unwrap();
    let (params, resolver) = config.to_params().unwrap();
    assert!(params.include_noise);

    let obs = observatory().with_resolver(resolver);
    let catalog = obs
        .sky_catalog(
            &simulator::StaticCatalog::new(small_field()),
            TARGET_RA,
            TARGET_DEC,
        )
        .unwrap();
    assert_eq!(catalog.len(), small_field().len());

    let background = ConstantBackground::new(5.0);
    let images = obs
        .sky_images(&catalog, &background, &params, None)
        .unwrap();
    let frame = images.frames.index_axis(ndarray::Axis(0), 0);
    assert_eq!(frame.dim(), (2048, 2048));

    // Corners sit outside the circular field stop
    assert_eq!(frame[[0, 0]], 0.0);
    assert_eq!(frame[[2047, 2047]], 0.0);

    // An empty patch inside the stop averages bias + background + dark
    let exposure = 0.2 * 2.0;
    let expected = 100.0 + 5.0 * exposure + 1.0 * exposure;
    let patch = frame.slice(ndarray::s![1300..1400, 1300..1400]);
    assert_relative_eq!(patch.mean().unwrap(), expected, epsilon = 0.5);
}
