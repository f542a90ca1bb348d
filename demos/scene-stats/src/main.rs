use cadscene::{
    CadScene, CloneAxis, LoadConfig,
    render::{RenderList, RenderListConfig},
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        anyhow::bail!("usage: scene-stats <scene.gltf|scene.obj> [clones] [axis]");
    };
    let clones = args.next().map(|c| c.parse()).transpose()?.unwrap_or(0);
    let axis: u32 = args.next().map(|a| a.parse()).transpose()?.unwrap_or(3);

    let mut scene = CadScene::new();
    scene.load_scene(&path, &LoadConfig::default(), clones, CloneAxis::from(axis))?;

    let list = RenderList::build(&scene, &RenderListConfig::default());
    let stats = list.stats();
    log::info!(
        "{path}: {} draws, {} triangles, {} meshlets, {} tasks",
        stats.draws,
        stats.tris,
        stats.meshlets,
        stats.tasks
    );
    println!(
        "objects {} geometries {} parts {} meshlets {}",
        scene.objects.len(),
        scene.geometry.len(),
        scene.num_object_parts,
        scene.num_meshlets()
    );
    println!("vbo {} abo {} ibo {} mesh {}", scene.vbo_size, scene.abo_size, scene.ibo_size, scene.mesh_size);
    println!("bbox {:?} .. {:?}", scene.bbox_instanced.min, scene.bbox_instanced.max);

    scene.unload();
    Ok(())
}
