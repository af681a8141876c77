use softpoly_core::math::mat::{frustum, translate};
use softpoly_core::prelude::*;

fn main() {
    let verts = [
        vertex([-1.0, 1.0, 0.0, 1.0], [0.0, 0.0]),
        vertex([0.0, -1.0, 0.0, 1.0], [0.5, 1.0]),
        vertex([1.0, 1.0, 0.0, 1.0], [1.0, 0.0]),
    ];
    // Horizontal gray gradient
    let tex = Texture::from_fn(8, 1, |u, _| 32 + 28 * u as u8).unwrap();

    let dims @ (w, h) = (64, 32);
    let modelview = translate(0.0, 0.0, -2.0);
    let project = frustum(-0.1, 0.1, -0.05, 0.05, 0.1, 1000.0);

    let mut framebuf = Framebuf::<u8>::new(w, h);
    let mut renderer = Renderer::new(Context::default());
    renderer.set_viewport(Viewport::new(0, 0, w as i32, h as i32, dims));

    renderer
        .draw(
            DrawArgs::new()
                .transform(modelview.then(&project))
                .texture(&tex),
            &verts,
        )
        .unwrap();
    let stats = renderer.finish(&mut framebuf).unwrap();

    for row in framebuf.color.rows() {
        let line: String = row
            .iter()
            .map(|&c| b" .:-=+*#%@"[c as usize * 10 / 256] as char)
            .collect();
        println!("{line}");
    }
    println!("{stats}");
}
