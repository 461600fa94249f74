//! MessagePack export and import of a whole factbase.

use im::Vector;
use tracing::debug;
use verdict_foundation::{Error, Result};

use crate::fact::Fact;
use crate::factbase::Factbase;

impl Factbase {
    /// Serializes every fact to MessagePack.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if encoding fails.
    pub fn export(&self) -> Result<Vec<u8>> {
        let bytes = rmp_serde::to_vec_named(&self.facts)
            .map_err(|e| Error::serialization(format!("failed to export factbase: {e}")))?;
        debug!(facts = self.len(), bytes = bytes.len(), "Factbase exported");
        Ok(bytes)
    }

    /// Loads facts previously produced by [`Factbase::export`].
    ///
    /// Only an empty factbase can import, so that ids, and the `cause` links
    /// that refer to them, stay valid.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the factbase is not empty, and a
    /// serialization error if the bytes are malformed or the ids are not
    /// dense.
    pub fn import(&mut self, bytes: &[u8]) -> Result<()> {
        if !self.is_empty() {
            return Err(Error::configuration(format!(
                "cannot import into a factbase that already holds {} facts",
                self.len()
            )));
        }
        let facts: Vector<Fact> = rmp_serde::from_slice(bytes)
            .map_err(|e| Error::serialization(format!("failed to import factbase: {e}")))?;
        if let Some((position, fact)) = facts
            .iter()
            .enumerate()
            .find(|(i, f)| f.id().index() != *i as u64)
        {
            return Err(Error::serialization(format!(
                "fact at position {position} carries id {}",
                fact.id()
            )));
        }
        debug!(facts = facts.len(), "Factbase imported");
        self.facts = facts;
        Ok(())
    }
}
