#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn uploads_and_draws_scene() {
    use cadscene::{
        CadScene, CloneAxis,
        context::Context,
        gpu::{Resources, WgpuResources, indirect_args},
        layout::SceneLayout,
        pipelines::uniforms::ViewUniform,
        render::{RenderList, RenderListConfig},
    };
    use cgmath::{Matrix4, Point3, Vector3};

    use crate::common::test_utils::{empty_geometry, grid_parts, quiet, single_instance};

    let _ = env_logger::try_init();
    let ctx = futures::executor::block_on(Context::new()).unwrap();

    // a faceless geometry must neither be drawn nor bound as an index slice
    let mut source = single_instance(grid_parts(8, 3));
    let empty = source.add_geometry(empty_geometry());
    source.add_instance(empty, cgmath::SquareMatrix::identity(), 0);

    let mut scene = CadScene::new();
    scene.load_source(&source, &quiet(), 2, CloneAxis::Auto).unwrap();
    let list = RenderList::build(&scene, &RenderListConfig::default());

    let args = indirect_args(&list, &SceneLayout::compute(&scene));
    assert_eq!(args.len(), list.len());
    assert!(args.iter().all(|a| a.instance_count == 1 && a.base_vertex == 0));

    let format = wgpu::TextureFormat::Rgba8Unorm;
    let mut resources = WgpuResources::new(&ctx, format, None);
    resources.init_scene(&scene).unwrap();
    resources.upload_render_list(&list).unwrap();
    assert_eq!(resources.stats(), list.stats());
    let layout = resources.scene_layout().unwrap();
    let (descs, prims) = resources.meshlet_buffers().unwrap();
    assert_eq!(descs.size(), layout.desc_size as u64);
    assert!(prims.size() >= layout.prim_size as u64);
    let grid = layout.geometries[0];
    assert_eq!(grid.mesh_push_constants(), [0, 0, 2, 0]);

    let view = cgmath::perspective(cgmath::Deg(45.0), 1.0, 0.1, 100.0)
        * Matrix4::look_at_rh(Point3::new(4.0, 4.0, 30.0), Point3::new(4.0, 4.0, 0.0), Vector3::unit_y());
    resources.set_view(ViewUniform::new(view, Vector3::new(0.0, 0.0, 1.0)));

    let target = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Test Target"),
        size: wgpu::Extent3d {
            width: 64,
            height: 64,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());
    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Test Encoder"),
        });
    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Test Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        resources.draw_solid(&list, &mut pass);
        resources.draw_bounding_boxes(&list, &mut pass);
    }
    ctx.queue.submit(std::iter::once(encoder.finish()));
    resources.synchronize().unwrap();

    resources.deinit_scene();
    assert!(!resources.is_initialized());
    assert_eq!(resources.stats(), Default::default());
}
