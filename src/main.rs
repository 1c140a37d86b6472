#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), point_cloud_gl::Error> {
    use point_cloud_gl::math::{FrameState, Spin};
    use point_cloud_gl::render::{
        BufferUsage, Camera, GpuContext, OrbitController, PointCloudScene, RecordingBackend, SceneConfig,
        SceneGeometry, WgpuBackend,
    };

    env_logger::init();

    let config = SceneConfig::default();
    let geometry = SceneGeometry::generate(&config, &mut rand::thread_rng());

    let mut backend = RecordingBackend::new();
    let scene = PointCloudScene::upload(&mut backend, &geometry, BufferUsage::StaticDraw)?;
    log::info!(
        "{} buffers staged with {} uploads",
        backend.buffer_count(),
        backend.upload_count()
    );

    let camera = Camera::default();
    let mut spin = Spin::new(config.spin_step);
    for frame_index in 0..3 {
        spin.advance();
        let frame = camera.frame(spin.model_matrix());
        backend.clear_calls();
        scene.render(&mut backend, &frame)?;
        log::info!("frame {frame_index}: angle {:.3}, {} backend calls", spin.angle, backend.calls().len());
        println!("frame {frame_index} MVP:\n{}", frame.mvp());
    }

    // a short drag followed by release, then let inertia settle
    let mut orbit = OrbitController::default();
    orbit.on_mouse_down(0.0, 0.0);
    orbit.on_mouse_move(40.0, 10.0);
    orbit.on_mouse_up();
    orbit.on_scroll(-1.0);
    for _ in 0..30 {
        orbit.update();
    }
    let frame = FrameState::new(spin.model_matrix(), orbit.view_matrix(), camera.projection());
    println!("orbit view after inertia:\n{}", orbit.view_matrix());
    scene.render(&mut backend, &frame)?;

    match pollster::block_on(GpuContext::headless()) {
        Ok(context) => {
            let mut gpu = WgpuBackend::new(&context);
            let uploaded = PointCloudScene::upload(&mut gpu, &geometry, BufferUsage::StaticDraw)?;
            let bytes: usize = uploaded
                .drawables()
                .flat_map(|d| [d.positions, d.colors])
                .filter_map(|h| gpu.byte_len(h))
                .sum();
            log::info!("uploaded {bytes} bytes to {}", context.adapter_info.name);
        }
        Err(e) => log::warn!("skipping GPU upload: {e}"),
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
