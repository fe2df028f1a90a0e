//! # Change Classifier
//!
//! Maps tree-diff entries to `git:add`, `git:remove` and `git:modify`
//! quads. The blob is the subject and the commit the object, so "which
//! commits touched this blob" and "what did this commit touch" are both one
//! hop. The label carries the path on the relevant side of the diff.

use crate::primitives::{PRED_ADD, PRED_MODIFY, PRED_REMOVE, iri};
use crate::source::{ChangeAction, ChangeRecord};
use crate::{CodegraphError, Quad, Value, identity};

/// Classify one diff entry. `Ok(None)` for actions that are not tracked.
pub fn classify(change: &ChangeRecord, commit: &Value) -> Result<Option<Quad>, CodegraphError> {
    let (predicate, path, hash) = match change.action {
        ChangeAction::Delete => (PRED_REMOVE, &change.from_path, &change.from_hash),
        ChangeAction::Insert => (PRED_ADD, &change.to_path, &change.to_hash),
        ChangeAction::Modify => (PRED_MODIFY, &change.to_path, &change.to_hash),
        ChangeAction::Other => return Ok(None),
    };

    let (Some(path), Some(hash)) = (path, hash) else {
        return Err(CodegraphError::InvalidChange(format!(
            "{:?} in {} lacks path or hash",
            change.action, commit
        )));
    };

    Ok(Some(
        Quad::new(identity::blob_iri(hash), iri(predicate), commit.clone())
            .with_label(path.as_str()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit() -> Value {
        identity::commit_iri("c0ffee")
    }

    #[test]
    fn insertion_labels_new_path() {
        let quad = classify(&ChangeRecord::insert("src/a.go", "aa"), &commit())
            .expect("classify")
            .expect("quad");
        assert_eq!(quad.subject, Value::iri("sha1:aa"));
        assert_eq!(quad.predicate, Value::iri(PRED_ADD));
        assert_eq!(quad.object, commit());
        assert_eq!(quad.label, Some(Value::string("src/a.go")));
    }

    #[test]
    fn deletion_uses_old_side() {
        let quad = classify(&ChangeRecord::delete("old.go", "bb"), &commit())
            .expect("classify")
            .expect("quad");
        assert_eq!(quad.subject, Value::iri("sha1:bb"));
        assert_eq!(quad.predicate, Value::iri(PRED_REMOVE));
        assert_eq!(quad.label, Some(Value::string("old.go")));
    }

    #[test]
    fn modification_uses_new_blob() {
        let quad = classify(&ChangeRecord::modify("m.go", "old", "new"), &commit())
            .expect("classify")
            .expect("quad");
        assert_eq!(quad.subject, Value::iri("sha1:new"));
        assert_eq!(quad.predicate, Value::iri(PRED_MODIFY));
    }

    #[test]
    fn other_actions_ignored() {
        let change = ChangeRecord {
            action: ChangeAction::Other,
            from_path: Some("a".to_string()),
            from_hash: Some("1".to_string()),
            to_path: Some("b".to_string()),
            to_hash: Some("1".to_string()),
        };
        assert!(classify(&change, &commit()).expect("classify").is_none());
    }

    #[test]
    fn missing_hash_is_invalid() {
        let change = ChangeRecord {
            action: ChangeAction::Insert,
            from_path: None,
            from_hash: None,
            to_path: Some("a.go".to_string()),
            to_hash: None,
        };
        assert!(matches!(
            classify(&change, &commit()),
            Err(CodegraphError::InvalidChange(_))
        ));
    }
}
