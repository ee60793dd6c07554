//! Precondition checks, re-evaluated on every host refresh

use crate::diagnostics::{Diagnostic, Ledger, evaluate_chain};
use crate::mesh::{MeshSource, UvChannel};
use crate::rig::Rig;

/// Animation checks in priority order, paired with whether each one fails
fn animation_checks<R: Rig + ?Sized>(rig: Option<&R>) -> [(Diagnostic, bool); 5] {
    let components = rig.map(|rig| rig.components()).unwrap_or_default();
    let has_clips = rig.is_some_and(|rig| !rig.clips().is_empty());
    [
        (Diagnostic::MissingRigObject, rig.is_none()),
        (Diagnostic::MissingSkinnedMesh, !components.skinned_mesh),
        (Diagnostic::MissingAnimator, !components.animator),
        (Diagnostic::MissingAnimatorController, !components.controller),
        (Diagnostic::NoAnimationClips, !has_clips),
    ]
}

/// First failing animation precondition, without touching any ledger
pub fn animation_blocker<R: Rig + ?Sized>(rig: Option<&R>) -> Option<Diagnostic> {
    animation_checks(rig)
        .into_iter()
        .find_map(|(key, failing)| failing.then_some(key))
}

/// Refresh the animation ledger; returns whether configuration may proceed
pub fn refresh_animation_diagnostics<R: Rig + ?Sized>(rig: Option<&R>, ledger: &mut Ledger) -> bool {
    evaluate_chain(ledger, &animation_checks(rig))
}

/// Refresh the mesh ledger; returns whether the mesh may be baked
pub fn refresh_mesh_diagnostics<M: MeshSource + ?Sized>(mesh: Option<&M>, ledger: &mut Ledger) -> bool {
    !ledger.set_condition(Diagnostic::MissingMesh, mesh.is_none())
}

/// Refresh the UV ledger; returns whether UVs may be applied
///
/// `UvAlreadyExists` is advisory: it is raised when `channel` already holds
/// data but does not block.
pub fn refresh_uv_diagnostics<M: MeshSource + ?Sized>(
    mesh: Option<&M>,
    channel: UvChannel,
    ledger: &mut Ledger,
) -> bool {
    if ledger.set_condition(Diagnostic::MissingUvMesh, mesh.is_none()) {
        ledger.set_condition(Diagnostic::UvAlreadyExists, false);
        return false;
    }
    let populated = mesh.is_some_and(|mesh| mesh.has_uv(channel));
    ledger.set_condition(Diagnostic::UvAlreadyExists, populated);
    true
}
