//! Document id and pickup code generation.

use std::collections::{HashMap, HashSet};

use rand::Rng;

use super::model::{DocumentId, PickupCode};

/// Characters used in pickup codes; no `0/O` or `1/I` look-alikes.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Characters used in generated document ids.
const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

const ID_LEN: usize = 12;

/// Issues document ids and pickup codes that are never reused.
///
/// Codes seen on documents loaded from storage are reserved as well, so a
/// generated code can never collide with an existing one.
#[derive(Debug, Clone)]
pub struct CodeIssuer {
    code_len: usize,
    codes: HashMap<String, DocumentId>,
    ids: HashSet<DocumentId>,
}

impl CodeIssuer {
    /// Creates an issuer producing codes of `code_len` characters.
    #[must_use]
    pub fn new(code_len: usize) -> Self {
        Self {
            code_len: code_len.max(4),
            codes: HashMap::new(),
            ids: HashSet::new(),
        }
    }

    /// Generates a fresh, unused pickup code for `owner`.
    pub fn issue_code(&mut self, owner: &DocumentId) -> PickupCode {
        loop {
            let candidate = random_string(CODE_ALPHABET, self.code_len);
            if !self.codes.contains_key(&candidate) {
                self.codes.insert(candidate.clone(), owner.clone());
                return PickupCode::new(&candidate);
            }
        }
    }

    /// Generates a fresh document id.
    pub fn issue_id(&mut self) -> DocumentId {
        loop {
            let candidate = DocumentId::new(format!("doc-{}", random_string(ID_ALPHABET, ID_LEN)));
            if self.ids.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Records a code that arrived from storage for `owner`.
    ///
    /// Returns `false` if the code already belongs to a different document.
    pub fn reserve_code(&mut self, code: &PickupCode, owner: &DocumentId) -> bool {
        match self.codes.get(code.as_str()) {
            Some(existing) => existing == owner,
            None => {
                self.codes.insert(code.as_str().to_string(), owner.clone());
                true
            }
        }
    }

    /// Records an id that arrived from storage.
    pub fn reserve_id(&mut self, id: &DocumentId) {
        self.ids.insert(id.clone());
    }
}

fn random_string(alphabet: &[u8], len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(alphabet[rng.gen_range(0..alphabet.len())]))
        .collect()
}
