//! `<animation>` blocks: one sampler/channel pair per animated bone.
//!
//! Channels of a track are keyed independently. They are merged onto one
//! timeline and every channel is evaluated at every timeline point, so
//! each emitted matrix is fully determined.

use glam::{Mat4, Quat, Vec3, Vec4};
use xmltree::Element;

use super::element::{fragment, input, ElementExt};
use super::skeleton::joint_id;
use super::source::{build_source, SourceData, INTERPOLATION, TIME, TRANSFORM};
use crate::options::ExportOptions;
use crate::scene::{AnimationTrack, Armature, ChannelProperty as P};
use crate::util::{flatten_matrix, Result};

/// Interpolation written for every sample.
pub const SAMPLE_INTERPOLATION: &str = "LINEAR";

/// Sorted, deduplicated union of all key times of a track.
pub fn merge_timeline(track: &AnimationTrack) -> Vec<f32> {
    let mut times: Vec<f32> = track.channels.iter().flat_map(|c| c.key_times()).collect();
    times.sort_by(f32::total_cmp);
    times.dedup();
    times
}

/// Pose transform of a track at `time`: `T * R * S`.
///
/// Missing channels fall back to the identity component. A zero-length
/// rotation quaternion is treated as identity.
pub fn pose_matrix(track: &AnimationTrack, time: f32) -> Mat4 {
    let eval = |p| track.evaluate(p, time);
    let translation = Vec3::new(eval(P::TranslationX), eval(P::TranslationY), eval(P::TranslationZ));
    let rotation = Vec4::new(eval(P::RotationX), eval(P::RotationY), eval(P::RotationZ), eval(P::RotationW))
        .try_normalize()
        .map(Quat::from_vec4)
        .unwrap_or(Quat::IDENTITY);
    let scale = Vec3::new(eval(P::ScaleX), eval(P::ScaleY), eval(P::ScaleZ));
    Mat4::from_scale_rotation_translation(scale, rotation, translation)
}

/// Local joint matrices at each timeline point: `rest * pose`.
pub fn sample_track(track: &AnimationTrack, rest: Mat4, times: &[f32]) -> Vec<Mat4> {
    times.iter().map(|&t| rest * pose_matrix(track, t)).collect()
}

/// Id of the animation element for a bone track.
pub fn animation_id(object: &str, bone: &str) -> String {
    format!("{}.anim", joint_id(object, bone))
}

/// Build the `<animation>` for one bone track.
///
/// Returns `None` for a track without keys.
pub fn build_animation(
    object: &str,
    armature: &Armature,
    track: &AnimationTrack,
    options: &ExportOptions,
) -> Result<Option<Element>> {
    let times = merge_timeline(track);
    if times.is_empty() {
        tracing::debug!("track '{}' of '{}' has no keys, skipped", track.bone, object);
        return Ok(None);
    }
    let rest = armature
        .bone(&track.bone)
        .map(|b| armature.parent_relative_matrix(b))
        .unwrap_or(Mat4::IDENTITY);
    let matrices = sample_track(track, rest, &times);

    let id = animation_id(object, &track.bone);
    let mut anim = Element::new("animation").with_attr("id", &id);

    let time_id = format!("{}.time", id);
    let scaled: Vec<f32> = times.iter().map(|t| t * options.time_scale).collect();
    build_source(&mut anim, &time_id, SourceData::Floats(&scaled), &TIME)?;

    let transform_id = format!("{}.transform", id);
    let flat: Vec<f32> = matrices
        .iter()
        .flat_map(|m| flatten_matrix(m, options.transpose_matrices))
        .collect();
    build_source(&mut anim, &transform_id, SourceData::Floats(&flat), &TRANSFORM)?;

    let interpolation_id = format!("{}.interpolation", id);
    let interpolation = vec![SAMPLE_INTERPOLATION.to_string(); times.len()];
    build_source(&mut anim, &interpolation_id, SourceData::Names(&interpolation), &INTERPOLATION)?;

    let sampler_id = format!("{}.sampler", id);
    anim.push(
        Element::new("sampler")
            .with_attr("id", &sampler_id)
            .with_child(input("INPUT", &time_id, None))
            .with_child(input("OUTPUT", &transform_id, None))
            .with_child(input("INTERPOLATION", &interpolation_id, None)),
    );
    anim.push(
        Element::new("channel")
            .with_attr("source", fragment(&sampler_id))
            .with_attr("target", format!("{}/transform", joint_id(object, &track.bone))),
    );

    Ok(Some(anim))
}

/// Build animations for every track of an armature object's action.
///
/// Tracks naming a bone the armature does not have are skipped with a
/// warning, since their channel target would not resolve.
#[tracing::instrument(skip_all, fields(object = %object))]
pub fn build_armature_animations(
    object: &str,
    armature: &Armature,
    tracks: &[AnimationTrack],
    options: &ExportOptions,
) -> Result<Vec<Element>> {
    let mut out = Vec::with_capacity(tracks.len());
    for track in tracks {
        if armature.bone(&track.bone).is_none() {
            tracing::warn!("animation track for unknown bone '{}' on '{}' skipped", track.bone, object);
            continue;
        }
        if let Some(anim) = build_animation(object, armature, track, options)? {
            out.push(anim);
        }
    }
    tracing::debug!(animations = out.len(), tracks = tracks.len(), "built armature animations");
    Ok(out)
}
