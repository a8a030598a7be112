use dynamic_lighting::core_modules::relight::decode_normal;
use dynamic_lighting::parallel_pipeline::PreviewWorker;
use dynamic_lighting::pipeline::{LightVectors, LightingPipeline, PipelineConfig};
use dynamic_lighting::{
    LightingError, Pixel, PixelBuffer, Vector3, decode_buffer, encode_buffer, normal_map, relight, smooth,
};

const QUANTUM: f64 = 1.0 / 255.0 + 1e-12;

/// Helper: a deterministic, non-uniform BGRA image.
fn synthetic_bgra(width: u32, height: u32) -> Vec<u8> {
    let mut raw = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let wave = ((x * 29 + y * 53) % 256) as u8;
            raw.extend_from_slice(&[wave, wave / 3, 255 - wave, 200 + (x % 50) as u8]);
        }
    }
    raw
}

// ---------------------------------------------------------------------------
// Raw byte interface
// ---------------------------------------------------------------------------

#[test]
fn decode_encode_round_trip_is_exact() {
    let (width, height) = (17, 9);
    let raw = synthetic_bgra(width, height);
    let buffer = decode_buffer(&raw, width, height).unwrap();

    assert_eq!(buffer.dimensions(), (width, height));
    assert_eq!(buffer.stride(), width as usize * 4);
    assert_eq!(buffer.present_count(), (width * height) as usize);
    assert_eq!(encode_buffer(&buffer), raw);
}

#[test]
fn normal_map_encodes_with_zeroed_border() {
    let buffer = PixelBuffer::filled(4, 4, Pixel::new(60, 60, 60, 255));
    let raw = encode_buffer(&normal_map(&buffer, 1.0).unwrap());
    // first pixel is border: absent
    assert_eq!(&raw[0..4], &[0, 0, 0, 0]);
    // (1, 1) is interior: flat normal as B, G, R, A
    let index = (4 + 1) * 4;
    assert_eq!(&raw[index..index + 4], &[255, 128, 128, 255]);
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[test]
fn smooth_preserves_dimensions() {
    let (width, height) = (13, 7);
    let buffer = decode_buffer(&synthetic_bgra(width, height), width, height).unwrap();
    let smoothed = smooth(&buffer).unwrap();
    assert_eq!(smoothed.dimensions(), buffer.dimensions());
    assert_eq!(smoothed.present_count(), buffer.present_count());
}

#[test]
fn smoothing_then_normal_map_on_uniform_image_is_flat() {
    let buffer = PixelBuffer::filled(10, 8, Pixel::new(33, 66, 99, 255));
    for strength in [0.05, 0.5, 2.0] {
        let normals = normal_map(&smooth(&buffer).unwrap(), strength).unwrap();
        for y in 1..7 {
            for x in 1..9 {
                let normal = decode_normal(&normals.get(x, y).unwrap());
                assert!(normal.x.abs() <= QUANTUM && normal.y.abs() <= QUANTUM);
                assert!((normal.z - 1.0).abs() <= QUANTUM);
            }
        }
    }
}

#[test]
fn decoded_normals_are_nearly_unit_length() {
    let (width, height) = (12, 12);
    let buffer = decode_buffer(&synthetic_bgra(width, height), width, height).unwrap();
    let normals = normal_map(&smooth(&buffer).unwrap(), 1.5).unwrap();

    for cell in normals.cells().iter().flatten() {
        let length = decode_normal(cell).norm();
        assert!((length - 1.0).abs() < 0.01, "normal length {length}");
    }
}

#[test]
fn zero_strength_is_an_invalid_argument() {
    let buffer = PixelBuffer::filled(3, 3, Pixel::new(128, 128, 128, 255));
    let err = normal_map(&buffer, 0.0).unwrap_err();
    assert!(matches!(err, LightingError::InvalidStrength { .. }));
    assert!(err.is_invalid_argument());
}

#[test]
fn single_pixel_image_cannot_be_smoothed_once_emptied() {
    let buffer = PixelBuffer::new(1, 1);
    assert!(matches!(smooth(&buffer), Err(LightingError::EmptyNeighborhood { x: 0, y: 0 })));
}

#[test]
fn relight_with_normal_aligned_light_keeps_interior() {
    let (width, height) = (5, 5);
    let buffer = decode_buffer(&synthetic_bgra(width, height), width, height).unwrap();
    let flat = PixelBuffer::filled(width, height, Pixel::new(128, 128, 255, 255));

    let lit = relight(&buffer, &flat, &Vector3::new(0.0, 0.0, 1.0), &Vector3::zeros()).unwrap();
    assert_eq!(lit, buffer);
}

#[test]
fn relight_rejects_mismatched_normal_map() {
    let buffer = PixelBuffer::filled(4, 4, Pixel::new(1, 2, 3, 4));
    let normals = PixelBuffer::filled(5, 4, Pixel::new(128, 128, 255, 255));
    let err = relight(&buffer, &normals, &Vector3::zeros(), &Vector3::zeros()).unwrap_err();
    assert!(err.is_invalid_argument());
}

// ---------------------------------------------------------------------------
// Pipeline and preview worker
// ---------------------------------------------------------------------------

#[test]
fn pipeline_is_independent_of_thread_count() {
    let (width, height) = (31, 23);
    let buffer = decode_buffer(&synthetic_bgra(width, height), width, height).unwrap();
    let vectors = LightVectors::new(Vector3::new(0.4, -0.3, 0.8), Vector3::new(0.1, 0.1, 0.6));

    let single = LightingPipeline::new(buffer.clone(), PipelineConfig { strength: 0.7, worker_threads: 1 }).unwrap();
    let many = LightingPipeline::new(buffer, PipelineConfig { strength: 0.7, worker_threads: 4 }).unwrap();

    assert_eq!(single.normal_map(), many.normal_map());
    assert_eq!(single.render(&vectors).unwrap(), many.render(&vectors).unwrap());
}

#[tokio::test]
async fn burst_of_renders_answers_every_caller() {
    let (width, height) = (40, 30);
    let buffer = decode_buffer(&synthetic_bgra(width, height), width, height).unwrap();
    let config = PipelineConfig { strength: 0.5, worker_threads: 2 };
    let direct = LightingPipeline::new(buffer.clone(), config.clone()).unwrap();
    let worker = PreviewWorker::spawn(LightingPipeline::new(buffer, config).unwrap()).unwrap();

    let bursts: Vec<LightVectors> = (0..8)
        .map(|i| LightVectors::new(Vector3::new(0.1 * i as f64, 0.0, 1.0), Vector3::zeros()))
        .collect();

    let results = futures::future::join_all(bursts.iter().map(|vectors| worker.render(*vectors))).await;

    assert_eq!(results.len(), bursts.len());
    for result in &results {
        assert!(result.is_ok());
    }
    // The newest request is never superseded.
    let newest = bursts.last().unwrap();
    assert_eq!(results.last().unwrap().as_ref().unwrap(), &direct.render(newest).unwrap());

    worker.join();
}

#[tokio::test]
async fn renders_queued_behind_slow_work_all_get_the_newest_image() {
    // Large enough that the strength change is still running when both renders arrive.
    let (width, height) = (800, 800);
    let buffer = decode_buffer(&synthetic_bgra(width, height), width, height).unwrap();
    let config = PipelineConfig { strength: 0.5, worker_threads: 2 };
    let mut direct = LightingPipeline::new(buffer.clone(), config.clone()).unwrap();
    let worker = PreviewWorker::spawn(LightingPipeline::new(buffer, config).unwrap()).unwrap();

    let older = LightVectors::new(Vector3::new(0.8, 0.0, 0.6), Vector3::zeros());
    let newer = LightVectors::new(Vector3::new(0.0, 0.8, 0.6), Vector3::new(0.0, 0.0, 0.4));

    let (normals, first, second) =
        futures::join!(worker.set_strength(0.7), worker.render(older), worker.render(newer));

    assert_eq!(&normals.unwrap(), direct.set_strength(0.7).unwrap());
    let expected = direct.render(&newer).unwrap();
    assert_ne!(expected, direct.render(&older).unwrap());
    assert_eq!(first.unwrap(), expected);
    assert_eq!(second.unwrap(), expected);

    worker.join();
}
