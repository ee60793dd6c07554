//! Two-bone strip: mesh, skeleton and clip data

use glam::{Mat4, Quat, Vec3};

/// Vertices of the strip: a bottom and a top ring of four
pub const VERTEX_COUNT: usize = 8;
/// Height of the tip joint above the hip
pub const SEGMENT_HEIGHT: f32 = 0.2;
const HALF_WIDTH: f32 = 0.1;

pub(crate) struct StripMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub joints: Vec<[u16; 4]>,
    pub weights: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
}

/// Keyframes of one clip, each targeting a node
pub(crate) struct ClipData {
    pub name: &'static str,
    pub translations: Vec<(u32, Vec<f32>, Vec<Vec3>)>,
    pub rotations: Vec<(u32, Vec<f32>, Vec<Quat>)>,
}

/// Rest position of vertex `i`: bottom ring first, then the top ring
pub fn rest_position(i: usize) -> Vec3 {
    let corners = [
        (-HALF_WIDTH, -HALF_WIDTH),
        (HALF_WIDTH, -HALF_WIDTH),
        (HALF_WIDTH, HALF_WIDTH),
        (-HALF_WIDTH, HALF_WIDTH),
    ];
    let (x, z) = corners[i % 4];
    let y = if i < 4 { 0.0 } else { SEGMENT_HEIGHT };
    Vec3::new(x, y, z)
}

pub(crate) fn create_mesh() -> StripMesh {
    let positions: Vec<Vec3> = (0..VERTEX_COUNT).map(rest_position).collect();
    let normals = positions
        .iter()
        .map(|p| Vec3::new(p.x, 0.0, p.z).normalize())
        .collect();
    let joints = (0..VERTEX_COUNT)
        .map(|i| if i < 4 { [0, 0, 0, 0] } else { [1, 0, 0, 0] })
        .collect();
    let weights = vec![[1.0, 0.0, 0.0, 0.0]; VERTEX_COUNT];

    // Four side quads between the rings
    let mut indices = Vec::new();
    for side in 0..4u32 {
        let (a, b) = (side, (side + 1) % 4);
        indices.extend([a, b, b + 4, a, b + 4, a + 4]);
    }

    StripMesh {
        positions,
        normals,
        joints,
        weights,
        indices,
    }
}

/// Hip at the origin, tip one segment above it
pub(crate) fn inverse_bind_matrices() -> Vec<Mat4> {
    vec![
        Mat4::IDENTITY,
        Mat4::from_translation(Vec3::new(0.0, -SEGMENT_HEIGHT, 0.0)),
    ]
}

/// "Wave" (1.0 s): the tip slides 0.1 along +X.
/// "Idle" (0.5 s): the hip rises 0.1, carrying the whole strip.
/// "Turn" (0.25 s): the hip turns a quarter around Y.
pub(crate) fn create_clips() -> Vec<ClipData> {
    vec![
        ClipData {
            name: "Wave",
            translations: vec![(
                2,
                vec![0.0, 1.0],
                vec![
                    Vec3::new(0.0, SEGMENT_HEIGHT, 0.0),
                    Vec3::new(0.1, SEGMENT_HEIGHT, 0.0),
                ],
            )],
            rotations: Vec::new(),
        },
        ClipData {
            name: "Idle",
            translations: vec![(1, vec![0.0, 0.5], vec![Vec3::ZERO, Vec3::new(0.0, 0.1, 0.0)])],
            rotations: Vec::new(),
        },
        ClipData {
            name: "Turn",
            translations: Vec::new(),
            rotations: vec![(
                1,
                vec![0.0, 0.25],
                vec![
                    Quat::IDENTITY,
                    Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
                ],
            )],
        },
    ]
}

/// "Blink" (0.02 s): the tip twitches, too short for a frame at 30 fps
pub(crate) fn blink_clip() -> ClipData {
    ClipData {
        name: "Blink",
        translations: vec![(
            2,
            vec![0.0, 0.02],
            vec![
                Vec3::new(0.0, SEGMENT_HEIGHT, 0.0),
                Vec3::new(0.0, SEGMENT_HEIGHT + 0.01, 0.0),
            ],
        )],
        rotations: Vec::new(),
    }
}
