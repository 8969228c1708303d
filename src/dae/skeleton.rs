//! Joint nodes for an armature's bone tree.
//!
//! The tree is walked with an explicit stack so deep rigs cannot exhaust
//! the call stack. Children are pushed in reverse so they pop in native
//! order; document order of sibling nodes is native order as well.

use xmltree::Element;

use super::element::{matrix_element, ElementExt};
use crate::options::ExportOptions;
use crate::scene::{Armature, Bone};
use crate::util::format_matrix;

/// Id of the joint node for `bone` under the armature object `object`.
pub fn joint_id(object: &str, bone: &str) -> String {
    format!("{}.{}", object, bone)
}

/// Result of walking one armature.
#[derive(Debug)]
pub struct JointTree {
    /// Root joint nodes in native root order.
    pub roots: Vec<Element>,
    /// Bone names in visit (pre-order) order.
    pub visit_order: Vec<String>,
}

/// Build `<node type="JOINT">` trees for every root bone.
///
/// Bone parent links must form a forest; callers validate the armature
/// first.
pub fn build_joint_tree(object: &str, armature: &Armature, options: &ExportOptions) -> JointTree {
    // Node slots are created when a bone is pushed and filled when it is
    // popped. Children always get higher slot numbers than their parent.
    let mut nodes: Vec<Option<Element>> = Vec::new();
    let mut child_slots: Vec<Vec<usize>> = Vec::new();
    let mut root_slots = Vec::new();
    let mut stack: Vec<(&Bone, usize)> = Vec::new();

    let roots: Vec<&Bone> = armature.roots().collect();
    for _ in &roots {
        root_slots.push(nodes.len());
        nodes.push(Some(Element::new("node")));
        child_slots.push(Vec::new());
    }
    for (bone, &slot) in roots.iter().zip(&root_slots).rev() {
        stack.push((*bone, slot));
    }

    let mut visit_order = Vec::with_capacity(armature.bones.len());
    while let Some((bone, slot)) = stack.pop() {
        visit_order.push(bone.name.clone());

        if let Some(node) = nodes[slot].take() {
            let mut node = node
                .with_attr("id", joint_id(object, &bone.name))
                .with_attr("name", &bone.name)
                .with_attr("sid", &bone.name)
                .with_attr("type", "JOINT")
                .with_child(matrix_element(
                    "transform",
                    format_matrix(&armature.parent_relative_matrix(bone), options.transpose_matrices),
                ));
            if options.bone_inverse_bind {
                node.push(matrix_element(
                    "inverse_bind",
                    format_matrix(&armature.inverse_bind_matrix(bone), options.transpose_matrices),
                ));
            }
            nodes[slot] = Some(node);
        }

        let children: Vec<&Bone> = armature.children(&bone.name).collect();
        let first = nodes.len();
        for _ in &children {
            nodes.push(Some(Element::new("node")));
            child_slots.push(Vec::new());
        }
        child_slots[slot].extend(first..nodes.len());
        for (i, child) in children.iter().enumerate().rev() {
            stack.push((*child, first + i));
        }
    }

    // Attach bottom-up: a child's subtree is complete before its parent
    for slot in (0..nodes.len()).rev() {
        let kids = std::mem::take(&mut child_slots[slot]);
        let subtrees: Vec<Element> = kids.into_iter().filter_map(|c| nodes[c].take()).collect();
        if let Some(node) = nodes[slot].as_mut() {
            for subtree in subtrees {
                node.push(subtree);
            }
        }
    }

    let roots = root_slots.into_iter().filter_map(|s| nodes[s].take()).collect();
    JointTree { roots, visit_order }
}
