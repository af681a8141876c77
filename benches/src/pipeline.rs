use criterion::*;

use softpoly_core::math::mat::{frustum, translate};
use softpoly_core::prelude::*;
use softpoly_core::render::clip::{ClipPoly, clip_tri};
use softpoly_core::render::raster::{ClipRect, Coverage, SetupTest, setup};
use softpoly_core::render::shader::shade_vertex;

const W: usize = 320;
const H: usize = 200;

fn quad() -> [Vertex; 4] {
    [
        vertex([-1.0, -1.0, 0.0, 1.0], [0.0, 0.0]),
        vertex([1.0, -1.0, 0.0, 1.0], [4.0, 0.0]),
        vertex([1.0, 1.0, 0.0, 1.0], [4.0, 4.0]),
        vertex([-1.0, 1.0, 0.0, 1.0], [0.0, 4.0]),
    ]
}

fn clip(c: &mut Criterion) {
    let proj = frustum(-0.1, 0.1, -0.0625, 0.0625, 0.1, 100.0);
    let tf = translate(0.5, 0.0, -1.0).then(&proj);
    let q = quad();
    let tri = [&q[0], &q[1], &q[2]].map(|v| shade_vertex(&tf, &[0.0, 0.0, 1.0, 0.2], v));

    let mut poly = ClipPoly::new();
    c.bench_function("clip straddling", |b| {
        b.iter(|| {
            clip_tri(black_box(&tri), &mut poly);
            poly.len()
        })
    });
}

fn block_setup(c: &mut Criterion) {
    let mut fb = Framebuf::<u32>::new(W, H);
    let targets = fb.split(1);
    let clip = ClipRect { left: 0, top: 0, right: W, bottom: H };
    let verts = [
        vertex([3.3, 2.7, 0.0, 1.0], [0.0; 2]),
        vertex([150.1, 190.6, 0.0, 1.0], [0.0; 2]),
        vertex([310.9, 20.2, 0.0, 1.0], [0.0; 2]),
    ];
    let tri = [&verts[0], &verts[1], &verts[2]];

    let mut cov = Coverage::new();
    c.bench_function("setup large", |b| {
        b.iter(|| {
            let test = SetupTest::Normal { stencil: 0 };
            setup(black_box(tri), test, &clip, &targets[0], &mut cov);
            cov.blocks_covered()
        })
    });
}

fn frame(c: &mut Criterion, name: &str, ctx: Context) {
    let tex = Texture::from_fn(64, 64, |u, v| {
        0xFF00_0000 | ((u ^ v) as u32 * 4) << 8
    })
    .unwrap();
    let proj = frustum(-0.1, 0.1, -0.0625, 0.0625, 0.1, 100.0);
    let mut fb = Framebuf::<u32>::new(W, H);
    let mut rdr = Renderer::new(ctx);
    let mut total = Stats::new();

    c.bench_function(name, |b| {
        b.iter(|| {
            rdr.set_viewport(Viewport::new(0, 0, W as i32, H as i32, (W, H)));
            rdr.clear_subsector(u32::MAX);
            for i in 0..16 {
                let z = 1.5 + 0.25 * i as f32;
                let args = DrawArgs::new()
                    .topology(Topology::Fan)
                    .transform(translate(0.1 * i as f32 - 0.8, 0.0, -z).then(&proj))
                    .texture(&tex)
                    .light(256 - 8 * i)
                    .subsector_test(true)
                    .subsector_depth(i)
                    .write_subsector(true);
                rdr.draw(args, &quad()).unwrap();
            }
            total += rdr.finish(&mut fb).unwrap();
        })
    });
    eprintln!("Stats/frame:\n{}", total.per_frame());
}

fn frame_serial(c: &mut Criterion) {
    frame(c, "frame serial", Context::default());
}

fn frame_threaded(c: &mut Criterion) {
    frame(c, "frame threaded", Context::with_available_cores());
}

criterion_group!(benches,
    clip,
    block_setup,
    frame_serial,
    frame_threaded);

criterion_main!(benches);
