//! Integration tests for query tree construction through the public API

#[cfg(test)]
mod query_tree_integration_tests {
    use querygraph::config::BuilderConfig;
    use querygraph::domain_model::{AttributeKind, DomainModel};
    use querygraph::query_tree::{BuildCtx, JoinType, NodeId, QueryTree, QueryTreeError};
    use test_case::test_case;

    fn model() -> DomainModel {
        DomainModel::from_yaml_str(
            r#"
types:
  - name: Person
    attributes:
      - { name: name, kind: singular, type: String }
      - { name: manager, kind: singular, type: Person }
      - { name: orders, kind: bag, type: Order }
      - { name: tags, kind: list, type: Tag }
      - { name: friends, kind: set, type: Person }
      - { name: scores, kind: map, key_type: String, type: Long }
  - name: Employee
    extends: Person
    attributes:
      - { name: badge, kind: singular, type: Badge }
  - name: Order
  - name: Tag
  - name: Badge
"#,
        )
        .unwrap()
    }

    type TypedJoin =
        fn(&mut BuildCtx<'_>, NodeId, &str, JoinType) -> Result<NodeId, QueryTreeError>;

    fn join_collection(
        ctx: &mut BuildCtx<'_>,
        from: NodeId,
        name: &str,
        jt: JoinType,
    ) -> Result<NodeId, QueryTreeError> {
        ctx.join_collection(from, name, jt)
    }

    fn join_list(
        ctx: &mut BuildCtx<'_>,
        from: NodeId,
        name: &str,
        jt: JoinType,
    ) -> Result<NodeId, QueryTreeError> {
        ctx.join_list(from, name, jt)
    }

    fn join_set(
        ctx: &mut BuildCtx<'_>,
        from: NodeId,
        name: &str,
        jt: JoinType,
    ) -> Result<NodeId, QueryTreeError> {
        ctx.join_set(from, name, jt)
    }

    fn join_map(
        ctx: &mut BuildCtx<'_>,
        from: NodeId,
        name: &str,
        jt: JoinType,
    ) -> Result<NodeId, QueryTreeError> {
        ctx.join_map(from, name, jt)
    }

    #[test_case(join_set, "tags", AttributeKind::Set, AttributeKind::List ; "set over list")]
    #[test_case(join_list, "orders", AttributeKind::List, AttributeKind::Bag ; "list over bag")]
    #[test_case(join_map, "friends", AttributeKind::Map, AttributeKind::Set ; "map over set")]
    #[test_case(join_collection, "scores", AttributeKind::Bag, AttributeKind::Map ; "bag over map")]
    #[test_case(
        join_set, "manager", AttributeKind::Set, AttributeKind::Singular ; "set over singular"
    )]
    fn test_typed_join_kind_mismatch(
        op: TypedJoin,
        attribute: &str,
        expected: AttributeKind,
        actual: AttributeKind,
    ) {
        let model = model();
        let mut ctx = BuildCtx::new(&model, "Person", Some("p")).unwrap();
        let root = ctx.root();
        let nodes_before = ctx.tree().len();

        let err = op(&mut ctx, root, attribute, JoinType::Inner).unwrap_err();

        assert_eq!(
            err,
            QueryTreeError::KindMismatch {
                attribute: attribute.to_string(),
                path: "p".to_string(),
                expected,
                actual,
            }
        );
        assert_eq!(ctx.tree().len(), nodes_before);
        assert!(!ctx.tree().has_joins(root));
    }

    #[test_case(join_collection, "orders", AttributeKind::Bag ; "bag")]
    #[test_case(join_list, "tags", AttributeKind::List ; "list")]
    #[test_case(join_set, "friends", AttributeKind::Set ; "set")]
    #[test_case(join_map, "scores", AttributeKind::Map ; "map")]
    fn test_typed_join_matches_kind(op: TypedJoin, attribute: &str, kind: AttributeKind) {
        let model = model();
        let mut ctx = BuildCtx::new(&model, "Person", Some("p")).unwrap();
        let root = ctx.root();

        let join = op(&mut ctx, root, attribute, JoinType::Left).unwrap();
        let tree = ctx.finish();

        assert_eq!(tree.node(join).join_data().and_then(|j| j.attribute_kind()), Some(kind));
        assert_eq!(tree.join_ledger(), &[join]);
    }

    /// Every join in the tree, walked from the root through joins and treats.
    fn reachable_joins(tree: &QueryTree, from: NodeId, out: &mut Vec<NodeId>) {
        for join in tree.sqm_joins(from) {
            out.push(*join);
            reachable_joins(tree, *join, out);
        }
        for treat in tree.treats(from) {
            reachable_joins(tree, *treat, out);
        }
    }

    #[test]
    fn test_ledger_matches_reachable_joins() {
        let model = model();
        let mut ctx = BuildCtx::new(&model, "Person", Some("p")).unwrap();
        let root = ctx.root();

        let manager = ctx.join(root, "manager", JoinType::Inner).unwrap();
        ctx.fetch(manager, "orders", JoinType::Left).unwrap();
        let employee = ctx.treat_as(manager, "Employee", None).unwrap();
        ctx.join(employee, "badge", JoinType::Left).unwrap();
        ctx.join_entity(root, "Tag", JoinType::Cross).unwrap();
        ctx.join_set(root, "friends", JoinType::Inner).unwrap();

        let tree = ctx.finish();
        let mut reachable = vec![];
        reachable_joins(&tree, root, &mut reachable);
        reachable.sort();
        let mut ledger = tree.join_ledger().to_vec();
        ledger.sort();

        assert_eq!(ledger, reachable);
        assert_eq!(ledger.len(), 5);
        for join in tree.join_ledger() {
            assert_eq!(tree.node(*join).root(), root);
        }
    }

    #[test]
    fn test_paths_are_unique_across_tree() {
        let model = model();
        let mut ctx = BuildCtx::new(&model, "Person", Some("p")).unwrap();
        let root = ctx.root();

        ctx.join(root, "manager", JoinType::Inner).unwrap();
        ctx.join(root, "manager", JoinType::Left).unwrap();
        ctx.join_entity(root, "Tag", JoinType::Cross).unwrap();
        ctx.join_entity(root, "Tag", JoinType::Cross).unwrap();
        ctx.add_treat(root, "Employee", None).unwrap();
        ctx.add_treat(root, "Employee", None).unwrap();

        let tree = ctx.finish();
        let mut paths: Vec<String> = tree.iter().map(|n| n.path().full_path()).collect();
        let total = paths.len();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), total);
        assert!(paths.contains(&"p.manager#2".to_string()));
        assert!(paths.contains(&"p.join(Tag)#2".to_string()));
        assert!(paths.contains(&"p.treat(Employee)#2".to_string()));
    }

    #[test]
    fn test_subtype_attribute_requires_treat() {
        let model = model();
        let mut ctx = BuildCtx::new(&model, "Person", Some("p")).unwrap();
        let root = ctx.root();

        let err = ctx.join(root, "badge", JoinType::Inner).unwrap_err();
        assert!(matches!(err, QueryTreeError::UnknownPath { .. }));

        let employee = ctx.treat_as(root, "Employee", Some("emp")).unwrap();
        let badge = ctx.join(employee, "badge", JoinType::Inner).unwrap();
        assert_eq!(ctx.tree().node(badge).path().full_path(), "p.treat(Employee).badge");
        assert_eq!(ctx.find_by_alias("emp"), Some(employee));
    }

    #[test]
    fn test_snapshot_round_trips_to_json() {
        let model = model();
        let config = BuilderConfig {
            alias_prefix: "a".to_string(),
            ..BuilderConfig::default()
        };
        let mut ctx = BuildCtx::with_config(&model, config, "Person", None).unwrap();
        let root = ctx.root();
        ctx.join_default(root, "tags").unwrap();

        let tree = ctx.finish();
        let json = serde_json::to_value(tree.snapshot("a")).unwrap();

        assert_eq!(json["from_clause"], "from Person a0 join a0.tags a1");
        assert_eq!(json["nodes"][1]["attribute_kind"], "list");
        assert_eq!(json["nodes"][1]["kind"], "join");
        assert!(json["nodes"][0].get("parent").is_none());
    }
}
