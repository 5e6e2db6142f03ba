// Collision detection module
// Finds batch members sharing a digest and drops them before reconciliation

use tracing::debug;

use super::batch::Batch;
use super::digest::{to_hex, Algorithm};

/// A batch file whose digest equals another batch file's digest
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CollisionResult {
    pub name: String,
    pub algorithm: Algorithm,
    pub digest_hex: String,
}

/// Result of filtering a batch
#[derive(Debug, Clone, Default)]
pub struct CollisionOutcome {
    /// Members that collided with nobody, in batch order
    pub survivors: Batch,
    /// One record per colliding member, in first-encountered order
    pub collisions: Vec<CollisionResult>,
}

/// Pairwise digest comparison over one batch
pub struct CollisionDetector;

impl CollisionDetector {
    /// Compare every pair `(i, j)` with `i < j` and split the batch
    ///
    /// Both members of an equal pair are marked; each marked member is
    /// reported once, the first time it is seen. `algorithm` only labels
    /// the output.
    pub fn detect(batch: &Batch, algorithm: Algorithm) -> CollisionOutcome {
        let files = batch.files();
        let mut colliding = vec![false; files.len()];
        let mut order = Vec::new();

        for i in 0..files.len() {
            for j in (i + 1)..files.len() {
                if files[i].bytes != files[j].bytes {
                    continue;
                }
                for k in [i, j] {
                    if !colliding[k] {
                        colliding[k] = true;
                        order.push(k);
                    }
                }
            }
        }

        let collisions: Vec<CollisionResult> = order
            .into_iter()
            .map(|k| CollisionResult {
                name: files[k].name.clone(),
                algorithm,
                digest_hex: to_hex(&files[k].bytes),
            })
            .collect();

        let mut position = 0;
        let survivors = batch.retain(|_| {
            let keep = !colliding[position];
            position += 1;
            keep
        });

        debug!(
            batch = files.len(),
            collisions = collisions.len(),
            survivors = survivors.len(),
            "collision scan finished"
        );

        CollisionOutcome {
            survivors,
            collisions,
        }
    }
}
