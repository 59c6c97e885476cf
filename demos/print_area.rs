//! Builds a box-shaped product with a floating print area, conforms the
//! print area onto it and prints the resulting camera.
//!
//! Run with `RUST_LOG=debug` to see every pipeline stage.

use glam::{Affine3A, Vec2, Vec3};

use conform::decal::TextureSwap;
use conform::export::ExportSettings;
use conform::resources::primitives::{PlaneOptions, create_box, create_plane};
use conform::resources::{Image, Material, Mesh};
use conform::scene::{Camera, Scene, ViewFramer};
use conform::{DecalPipeline, FramingConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut scene = Scene::new();
    scene.add_mesh(Mesh::new("Bag", create_box(0.13, 0.195, 0.045), Material::new("Kraft")));
    let patch = create_plane(PlaneOptions {
        width: 0.08,
        height: 0.1,
        ..Default::default()
    });
    let key = scene.add_mesh(
        Mesh::new("Plane.001", patch, Material::new("PrintArea"))
            .with_world_matrix(Affine3A::from_translation(Vec3::new(0.0, 0.0, 0.03))),
    );

    let mut camera = Camera::new_perspective(35.0, 16.0 / 9.0, 0.01, 100.0);
    let report = DecalPipeline::default().prepare(&mut scene, &mut camera);
    println!("{report:#?}");

    // Artwork arrives from a loader thread.
    let mut swap = TextureSwap::new();
    let sender = swap.sender();
    std::thread::spawn(move || sender.loaded(1, Image::solid("artwork", [220, 40, 40, 255])))
        .join()
        .ok();
    if let Some(material) = scene.get_mesh_mut(key).map(|m| &mut m.material) {
        swap.apply_pending(material);
    }

    // Nudge the product to the left third of a 1280x720 view.
    let mut framer = ViewFramer::new(FramingConfig::default());
    if let Some(bounds) = scene.bounding_box() {
        framer.set_subject(bounds);
    }
    framer.request_resize(1280, 720);
    framer.request_offset(Vec2::new(-0.33, 0.0));
    if let Err(err) = framer.flush(&mut camera) {
        eprintln!("framing failed: {err}");
    }

    println!("camera position {:.4}", camera.position);
    println!("camera target   {:.4}", camera.target);
    println!("near/far        {:.4} / {:.2}", camera.near, camera.far);

    let plan = ExportSettings::default().plan(&camera, Vec2::new(1280.0, 720.0));
    println!("export size     {} (aspect {:.3})", plan.size, plan.camera.aspect);
}
