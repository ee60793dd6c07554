//! Node hierarchy composition and linear-blend skinning

use glam::{Mat4, Vec3};

use super::NodeTransform;

/// Parent links plus an order in which every parent precedes its children
#[derive(Debug, Clone)]
pub(crate) struct Hierarchy {
    parents: Vec<Option<usize>>,
    order: Vec<usize>,
}

impl Hierarchy {
    /// Build from per-node child lists
    pub(crate) fn new(children: &[Vec<usize>]) -> Self {
        let mut parents = vec![None; children.len()];
        for (parent, kids) in children.iter().enumerate() {
            for &child in kids {
                if child < parents.len() {
                    parents[child] = Some(parent);
                }
            }
        }

        let mut visited = vec![false; children.len()];
        let mut order = Vec::with_capacity(children.len());
        let mut stack: Vec<usize> = (0..children.len())
            .rev()
            .filter(|&node| parents[node].is_none())
            .collect();
        while let Some(node) = stack.pop() {
            if std::mem::replace(&mut visited[node], true) {
                continue;
            }
            order.push(node);
            stack.extend(children[node].iter().rev().filter(|&&c| c < children.len()));
        }

        Self { parents, order }
    }

    pub(crate) fn len(&self) -> usize {
        self.parents.len()
    }

    #[cfg(test)]
    pub(crate) fn parent(&self, node: usize) -> Option<usize> {
        self.parents.get(node).copied().flatten()
    }

    /// Compose local transforms into world matrices
    pub(crate) fn globals(&self, locals: &[NodeTransform], out: &mut Vec<Mat4>) {
        out.clear();
        out.resize(self.parents.len(), Mat4::IDENTITY);
        for &node in &self.order {
            let local = locals[node].to_mat4();
            out[node] = match self.parents[node] {
                Some(parent) => out[parent] * local,
                None => local,
            };
        }
    }
}

/// Bind-pose vertices with up to four joint influences each
#[derive(Debug, Clone, Default)]
pub(crate) struct SkinnedVertices {
    pub positions: Vec<Vec3>,
    pub joints: Vec<[u16; 4]>,
    pub weights: Vec<[f32; 4]>,
}

impl SkinnedVertices {
    pub(crate) fn len(&self) -> usize {
        self.positions.len()
    }

    /// Deform the bind pose by `joint_matrices` into `out`
    ///
    /// Vertices without any weight keep their bind position.
    pub(crate) fn skin(&self, joint_matrices: &[Mat4], out: &mut Vec<Vec3>) {
        out.clear();
        out.reserve(self.positions.len());
        for ((&position, joints), weights) in self
            .positions
            .iter()
            .zip(&self.joints)
            .zip(&self.weights)
        {
            let mut skinned = Vec3::ZERO;
            let mut total = 0.0;
            for (&joint, &weight) in joints.iter().zip(weights) {
                if weight == 0.0 {
                    continue;
                }
                let Some(matrix) = joint_matrices.get(joint as usize) else {
                    continue;
                };
                skinned += matrix.transform_point3(position) * weight;
                total += weight;
            }
            out.push(if total > 0.0 { skinned / total } else { position });
        }
    }
}
