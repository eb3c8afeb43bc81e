//! Integration tests for building query trees from YAML navigation plans

#[cfg(test)]
mod navigation_plan_integration_tests {
    use std::fs;
    use std::path::PathBuf;

    use querygraph::config::BuilderConfig;
    use querygraph::domain_model::DomainModel;
    use querygraph::navigation_plan::{NavigationPlan, NavigationPlanError};
    use querygraph::query_tree::{JoinType, QueryTreeError};
    use tempfile::TempDir;

    const MODEL_YAML: &str = r#"
name: company
types:
  - name: Person
    attributes:
      - { name: name, kind: singular, type: String }
      - { name: manager, kind: singular, type: Person }
      - { name: address, kind: singular, type: Address }
      - { name: orders, kind: bag, type: Order }
      - { name: tags, kind: list, type: Tag }
      - { name: friends, kind: set, type: Person }
      - { name: scores, kind: map, key_type: String, type: Long }
  - name: Manager
    extends: Person
    attributes:
      - { name: reports, kind: bag, type: Person }
  - name: Order
    attributes:
      - { name: customer, kind: singular, type: Person }
  - name: Tag
  - name: Country
  - name: Address
    kind: embeddable
    attributes:
      - { name: city, kind: singular, type: String }
      - { name: country, kind: singular, type: Country }
"#;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn load_model(dir: &TempDir) -> DomainModel {
        DomainModel::from_yaml_file(write(dir, "model.yaml", MODEL_YAML)).unwrap()
    }

    #[test]
    fn test_plan_from_files() {
        let dir = TempDir::new().unwrap();
        let model = load_model(&dir);
        let plan_path = write(
            &dir,
            "plan.yaml",
            r#"
root: { entity: Person, alias: e }
steps:
  - join: { from: e, attribute: manager, alias: m }
  - fetch: { from: m, attribute: orders, join_type: left }
  - treat: { from: e, target: Manager, alias: boss }
  - join_collection: { from: boss, attribute: reports, alias: r }
  - path: { from: e, attribute: address, alias: addr }
  - join: { from: addr, attribute: country, alias: c, join_type: left }
  - entity_join: { from: e, entity: Tag, alias: t, join_type: cross }
"#,
        );

        let plan = NavigationPlan::from_yaml_file(plan_path).unwrap();
        let tree = plan.build(&model, BuilderConfig::default()).unwrap();

        assert_eq!(
            tree.render_from_clause("alias_"),
            "from Person e join e.manager m left join fetch m.orders alias_2 \
             join treat(e as Manager).reports r left join e.address.country c cross join Tag t"
        );
        assert_eq!(tree.join_ledger().len(), 5);
    }

    #[test]
    fn test_plan_uses_configured_default_join_type() {
        let dir = TempDir::new().unwrap();
        let model = load_model(&dir);
        let plan = NavigationPlan::from_yaml_str(
            r#"
root: { entity: Person, alias: e }
steps:
  - join_set: { from: e, attribute: friends }
"#,
        )
        .unwrap();

        let config = BuilderConfig {
            default_join_type: JoinType::Left,
            ..BuilderConfig::default()
        };
        let tree = plan.build(&model, config).unwrap();
        assert_eq!(
            tree.render_from_clause("alias_"),
            "from Person e left join e.friends alias_1"
        );
    }

    #[test]
    fn test_plan_rejects_aliased_plural_fetch_when_disallowed() {
        let dir = TempDir::new().unwrap();
        let model = load_model(&dir);
        let plan = NavigationPlan::from_yaml_str(
            r#"
root: { entity: Person, alias: e }
steps:
  - fetch: { from: e, attribute: orders, alias: o }
"#,
        )
        .unwrap();

        let config = BuilderConfig {
            allow_aliased_plural_fetch: false,
            ..BuilderConfig::default()
        };
        let err = plan.build(&model, config).unwrap_err();
        assert_eq!(
            err,
            NavigationPlanError::Step {
                step: 1,
                source: QueryTreeError::AliasedPluralFetch {
                    path: "e.orders".to_string()
                }
            }
        );
    }

    #[test]
    fn test_plan_with_unknown_root_entity() {
        let dir = TempDir::new().unwrap();
        let model = load_model(&dir);
        let plan = NavigationPlan::from_yaml_str("root: { entity: Address }").unwrap();

        let err = plan.build(&model, BuilderConfig::default()).unwrap_err();
        assert_eq!(
            err,
            NavigationPlanError::Root(QueryTreeError::UnknownEntity {
                entity: "Address".to_string()
            })
        );
    }

    #[test]
    fn test_malformed_plan_is_parse_error() {
        let err = NavigationPlan::from_yaml_str(
            r#"
root: { entity: Person }
steps:
  - teleport: { from: e }
"#,
        )
        .unwrap_err();
        assert!(matches!(err, NavigationPlanError::ParseError { .. }));
    }

    #[test]
    fn test_missing_plan_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let err = NavigationPlan::from_yaml_file(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, NavigationPlanError::ReadError { .. }));
    }
}
