//! Armature data blocks (bone trees in rest pose).

use std::collections::HashMap;

use glam::Mat4;
use serde::{Deserialize, Serialize};

use crate::util::{Error, Result};

/// A bone in rest pose.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Rest matrix in armature space.
    #[serde(default)]
    pub matrix_local: Mat4,
}

impl Bone {
    pub fn new(name: impl Into<String>, parent: Option<&str>, matrix_local: Mat4) -> Self {
        Self {
            name: name.into(),
            parent: parent.map(str::to_string),
            matrix_local,
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Armature data block.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Armature {
    pub name: String,
    /// Bones in native order.
    pub bones: Vec<Bone>,
}

impl Armature {
    pub fn new(name: impl Into<String>, bones: Vec<Bone>) -> Self {
        Self { name: name.into(), bones }
    }

    /// Look up a bone by name.
    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name == name)
    }

    /// Bones without a parent, in native order.
    pub fn roots(&self) -> impl Iterator<Item = &Bone> {
        self.bones.iter().filter(|b| b.is_root())
    }

    /// Direct children of `name`, in native order.
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Bone> + 'a {
        self.bones
            .iter()
            .filter(move |b| b.parent.as_deref() == Some(name))
    }

    /// Rest matrix relative to the parent bone (armature space for roots).
    pub fn parent_relative_matrix(&self, bone: &Bone) -> Mat4 {
        match bone.parent.as_deref().and_then(|p| self.bone(p)) {
            Some(parent) => parent.matrix_local.inverse() * bone.matrix_local,
            None => bone.matrix_local,
        }
    }

    /// Inverse of the armature-space rest matrix.
    pub fn inverse_bind_matrix(&self, bone: &Bone) -> Mat4 {
        bone.matrix_local.inverse()
    }

    /// Check that parent links name existing bones and form a forest.
    pub fn validate(&self) -> Result<()> {
        let index: HashMap<&str, usize> = self
            .bones
            .iter()
            .enumerate()
            .map(|(i, b)| (b.name.as_str(), i))
            .collect();

        let mut parent_of = Vec::with_capacity(self.bones.len());
        for bone in &self.bones {
            let parent = match bone.parent.as_deref() {
                Some(p) => Some(*index.get(p).ok_or_else(|| Error::UnknownParent {
                    armature: self.name.clone(),
                    bone: bone.name.clone(),
                    parent: p.to_string(),
                })?),
                None => None,
            };
            parent_of.push(parent);
        }

        // 0 = unvisited, 1 = on current chain, 2 = known to reach a root
        let mut state = vec![0u8; self.bones.len()];
        for start in 0..self.bones.len() {
            let mut chain = Vec::new();
            let mut cur = Some(start);
            while let Some(i) = cur {
                match state[i] {
                    2 => break,
                    1 => {
                        return Err(Error::BoneCycle {
                            armature: self.name.clone(),
                            bone: self.bones[i].name.clone(),
                        })
                    }
                    _ => {
                        state[i] = 1;
                        chain.push(i);
                        cur = parent_of[i];
                    }
                }
            }
            for i in chain {
                state[i] = 2;
            }
        }
        Ok(())
    }
}
