use super::*;

#[test]
fn test_new_rejects_empty() {
    assert!(BranchName::new("").is_none());
    assert_eq!(BranchName::new("master").unwrap().as_str(), "master");
}

#[test]
fn test_string_ids_serialize_as_plain_strings() {
    let key = PullRequestKey::new("99").unwrap();
    assert_eq!(serde_json::to_string(&key).unwrap(), r#""99""#);
    let back: PullRequestKey = serde_json::from_str(r#""99""#).unwrap();
    assert_eq!(back, key);
}

#[test]
fn test_deserializing_empty_id_fails() {
    let err = serde_json::from_str::<BranchName>(r#""""#).unwrap_err();
    assert!(err.to_string().contains("BranchName must not be empty"));
    assert!(serde_json::from_str::<PullRequestKey>(r#""""#).is_err());
    assert!(serde_json::from_str::<Option<BranchUuid>>(r#""""#).is_err());
    assert!(serde_json::from_str::<Option<BranchUuid>>("null")
        .unwrap()
        .is_none());
}

#[test]
fn test_run_ids_are_unique() {
    assert_ne!(DecorationRunId::new_random(), DecorationRunId::new_random());
}
