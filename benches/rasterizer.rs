use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use softshade::prelude::*;
use softshade::render::rasterizer::{color_vertex, rasterize_triangle, ColorShader, Vertex};

const BUFFER_WIDTH: u32 = 800;
const BUFFER_HEIGHT: u32 = 600;

fn viewport() -> Viewport {
    Viewport::new(0.0, BUFFER_WIDTH as f32, 0.0, BUFFER_HEIGHT as f32, BUFFER_WIDTH, BUFFER_HEIGHT)
}

fn triangle(points: [(f32, f32); 3]) -> [Vertex<6>; 3] {
    let colors = [
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
    ];
    std::array::from_fn(|i| color_vertex(Vec3::new(points[i].0, points[i].1, 0.0), colors[i]))
}

fn small_triangle() -> [Vertex<6>; 3] {
    triangle([(100.0, 100.0), (120.0, 100.0), (110.0, 120.0)])
}

fn medium_triangle() -> [Vertex<6>; 3] {
    triangle([(100.0, 100.0), (300.0, 100.0), (200.0, 300.0)])
}

fn large_triangle() -> [Vertex<6>; 3] {
    triangle([(50.0, 50.0), (750.0, 100.0), (400.0, 550.0)])
}

fn benchmark_single_triangle(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_triangle");
    let viewport = viewport();

    for (name, tri) in [
        ("small", small_triangle()),
        ("medium", medium_triangle()),
        ("large", large_triangle()),
    ] {
        group.bench_with_input(BenchmarkId::new("color_shader", name), &tri, |b, tri| {
            let mut canvas = Canvas::new(viewport);
            b.iter(|| {
                rasterize_triangle(&viewport, black_box(tri), &mut ColorShader::new(&mut canvas))
            });
        });

        group.bench_with_input(BenchmarkId::new("count_only", name), &tri, |b, tri| {
            b.iter(|| {
                let mut count = 0u32;
                rasterize_triangle(&viewport, black_box(tri), &mut |_: i32, _: i32, _: &[f32; 6]| {
                    count += 1;
                });
                count
            });
        });
    }

    group.finish();
}

fn benchmark_many_triangles(c: &mut Criterion) {
    let mut group = c.benchmark_group("many_triangles");
    let viewport = viewport();

    // Generate a grid of small triangles
    let triangles: Vec<[Vertex<6>; 3]> = (0..20)
        .flat_map(|row| {
            (0..20).map(move |col| {
                let x = col as f32 * 40.0;
                let y = row as f32 * 30.0;
                triangle([(x, y), (x + 35.0, y), (x + 17.5, y + 25.0)])
            })
        })
        .collect();

    group.bench_function("color_shader_400_triangles", |b| {
        let mut canvas = Canvas::new(viewport);
        b.iter(|| {
            let mut shader = ColorShader::new(&mut canvas);
            for tri in &triangles {
                rasterize_triangle(&viewport, black_box(tri), &mut shader);
            }
        });
    });

    group.bench_function("line_400_triangle_outlines", |b| {
        let mut canvas = Canvas::new(viewport);
        b.iter(|| {
            for tri in &triangles {
                for (i, j) in [(0, 1), (1, 2), (2, 0)] {
                    let a = &tri[i].attributes;
                    let z = &tri[j].attributes;
                    canvas.draw_line((a[0], a[1]), (z[0], z[1]));
                }
            }
        });
    });

    group.finish();
}

fn benchmark_cube_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("cube_frame");
    let config = RenderConfig {
        width: BUFFER_WIDTH,
        height: BUFFER_HEIGHT,
        ..RenderConfig::default()
    };
    let scene = config
        .build_scene(MeshData::cube())
        .expect("default scene is valid");

    for shading in [ShadingMode::Flat, ShadingMode::Gouraud, ShadingMode::Phong] {
        group.bench_function(shading.to_string(), |b| {
            let mut engine = config.engine();
            engine.set_shading_mode(shading);
            b.iter(|| engine.render(black_box(&scene)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_single_triangle,
    benchmark_many_triangles,
    benchmark_cube_frame
);
criterion_main!(benches);
