//! Merkle tree construction and proof verification.
//!
//! `merkle_tree`/`generate_proof`/`is_valid_merkle_branch` implement the
//! zero-padded, power-of-two SSZ style tree used for object-root
//! merkleization (§4.1 of the design). `deposit_tree_root` implements the
//! distinct deposit tree shape from the wire format section: a binary tree
//! over an arbitrary number of leaves that duplicates the last leaf when the
//! current layer is odd, rather than zero-padding to the next power of two.

use alloy_primitives::B256;
use anyhow::ensure;

fn get_generalized_index_bit(index: u64, position: u64) -> bool {
    (index & (1 << position)) > 0
}

fn get_generalized_index_child(index: u64, right_side: bool) -> u64 {
    index * 2 + right_side as u64
}

fn get_subtree_index(generalized_index: u64) -> u64 {
    generalized_index % (1 << (generalized_index as f64).log2().floor() as u64)
}

pub fn merkle_tree(leaves: &[B256], depth: u64) -> anyhow::Result<Vec<B256>> {
    let num_of_leaves = leaves.len();
    let bottom_length = 1 << depth;
    ensure!(
        num_of_leaves <= bottom_length,
        "Number of leaves is greater than the bottom length (depth too small)"
    );

    let mut tree = vec![B256::ZERO; bottom_length];
    tree.extend(leaves);
    tree.extend(vec![B256::ZERO; bottom_length - num_of_leaves]);

    for i in (1..bottom_length).rev() {
        let left = tree[i * 2].as_slice();
        let right = tree[i * 2 + 1].as_slice();
        tree[i] = ethereum_hashing::hash32_concat(left, right).into();
    }

    Ok(tree)
}

pub fn generate_proof(tree: &[B256], index: u64, depth: u64) -> anyhow::Result<Vec<B256>> {
    let bottom_length = 1 << depth;
    ensure!(index < bottom_length, "Index out of bounds");

    let mut proof = vec![];
    let mut current_index = 1;
    let mut current_depth = depth;

    while current_depth > 0 {
        let (left_child_index, right_child_index) = (
            get_generalized_index_child(current_index, false),
            get_generalized_index_child(current_index, true),
        );

        if get_generalized_index_bit(index, current_depth - 1) {
            proof.push(tree[left_child_index as usize]);
            current_index = right_child_index;
        } else {
            proof.push(tree[right_child_index as usize]);
            current_index = left_child_index;
        }

        current_depth -= 1;
    }

    proof.reverse();

    Ok(proof)
}

pub fn is_valid_merkle_branch(
    leaf: B256,
    branch: &[B256],
    depth: u64,
    index: u64,
    root: B256,
) -> bool {
    let mut value = leaf;
    for (i, node) in branch.iter().enumerate().take(depth as usize) {
        if get_generalized_index_bit(index, i as u64) {
            value = ethereum_hashing::hash32_concat(node.as_slice(), value.as_slice()).into();
        } else {
            value = ethereum_hashing::hash32_concat(value.as_slice(), node.as_slice()).into();
        }
    }
    value == root
}

pub fn is_valid_normalized_merkle_branch(
    leaf: B256,
    branch: &[B256],
    generalized_index: u64,
    root: B256,
) -> bool {
    let depth = (generalized_index as f64).log2().floor() as u64;
    let index = get_subtree_index(generalized_index);
    let num_extra = branch.len() - depth as usize;
    for node in branch[..num_extra].iter() {
        if *node != B256::ZERO {
            return false;
        }
    }
    is_valid_merkle_branch(leaf, &branch[num_extra..], depth, index, root)
}

/// Deposit leaf hash per the wire format: `pubkey ‖ withdrawal_credentials ‖
/// le_u64(amount) ‖ le_u64(index)`.
pub fn deposit_leaf(pubkey: &[u8; 48], withdrawal_credentials: B256, amount: u64, index: u64) -> B256 {
    let mut preimage = Vec::with_capacity(48 + 32 + 8 + 8);
    preimage.extend_from_slice(pubkey);
    preimage.extend_from_slice(withdrawal_credentials.as_slice());
    preimage.extend_from_slice(&amount.to_le_bytes());
    preimage.extend_from_slice(&index.to_le_bytes());
    B256::from(ethereum_hashing::hash_fixed(&preimage))
}

/// Deposit Merkle root: a binary tree over exactly `leaves.len()` leaves
/// (no zero-padding to a power of two); the last leaf of an odd-sized layer
/// is duplicated to pair it off before hashing.
pub fn deposit_tree_root(leaves: &[B256]) -> B256 {
    if leaves.is_empty() {
        return B256::ZERO;
    }

    let mut layer = leaves.to_vec();
    while layer.len() > 1 {
        if layer.len() % 2 == 1 {
            let last = *layer.last().expect("layer is non-empty");
            layer.push(last);
        }
        layer = layer
            .chunks_exact(2)
            .map(|pair| ethereum_hashing::hash32_concat(pair[0].as_slice(), pair[1].as_slice()).into())
            .collect();
    }
    layer[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merkle_tree_round_trip() {
        let leaves = vec![
            B256::from_slice(&[0xAA; 32]),
            B256::from_slice(&[0xBB; 32]),
            B256::from_slice(&[0xCC; 32]),
            B256::from_slice(&[0xDD; 32]),
        ];

        let depth = (leaves.len() as f64).log2().floor() as u64;
        let tree = merkle_tree(&leaves, depth).unwrap();

        for (i, leaf) in leaves.iter().enumerate() {
            let proof = generate_proof(&tree, i as u64, depth).unwrap();
            assert!(is_valid_merkle_branch(*leaf, &proof, depth, i as u64, tree[1]));
        }
    }

    #[test]
    fn deposit_tree_root_is_deterministic_over_order() {
        let leaves = vec![
            B256::from_slice(&[1; 32]),
            B256::from_slice(&[2; 32]),
            B256::from_slice(&[3; 32]),
        ];
        let root_a = deposit_tree_root(&leaves);
        let root_b = deposit_tree_root(&leaves);
        assert_eq!(root_a, root_b);

        let mut reordered = leaves.clone();
        reordered.swap(0, 2);
        assert_ne!(deposit_tree_root(&reordered), root_a);
    }

    #[test]
    fn deposit_tree_root_duplicates_last_leaf_when_odd() {
        let leaves = vec![B256::from_slice(&[1; 32]), B256::from_slice(&[2; 32]), B256::from_slice(&[3; 32])];
        let expected_layer = [
            ethereum_hashing::hash32_concat(leaves[0].as_slice(), leaves[1].as_slice()),
            ethereum_hashing::hash32_concat(leaves[2].as_slice(), leaves[2].as_slice()),
        ];
        let expected_root: B256 =
            ethereum_hashing::hash32_concat(&expected_layer[0], &expected_layer[1]).into();
        assert_eq!(deposit_tree_root(&leaves), expected_root);
    }

    #[test]
    fn deposit_tree_root_empty_is_zero() {
        assert_eq!(deposit_tree_root(&[]), B256::ZERO);
    }
}
