use super::*;

fn machine_agent() -> EntityAuthorizer {
    EntityAuthorizer::new(Tag::machine("0").unwrap())
}

fn unit_agent() -> EntityAuthorizer {
    EntityAuthorizer::new(Tag::unit("mysql/0").unwrap())
}

fn client() -> EntityAuthorizer {
    EntityAuthorizer::new(Tag::user("admin").unwrap())
}

#[test]
fn entity_authorizer_roles_follow_the_tag_kind() {
    assert!(machine_agent().auth_machine_agent());
    assert!(!machine_agent().auth_unit_agent());
    assert!(unit_agent().auth_unit_agent());
    assert!(client().auth_client());
    assert!(!client().auth_controller());
    assert!(machine_agent().with_controller(true).auth_controller());
}

#[test]
fn agent_requirement_accepts_machine_and_unit_agents_only() {
    assert!(AuthRequirement::Agent.check(&machine_agent()).is_ok());
    assert!(AuthRequirement::Agent.check(&unit_agent()).is_ok());

    let err = AuthRequirement::Agent.check(&client()).unwrap_err();
    assert!(err.is_permission_denied());
}

#[test]
fn client_requirement_rejects_agents() {
    assert!(AuthRequirement::Client.check(&client()).is_ok());
    assert!(AuthRequirement::Client.check(&unit_agent()).unwrap_err().is_permission_denied());
}

#[test]
fn controller_requirement_ignores_the_tag_kind() {
    assert!(AuthRequirement::Controller.check(&machine_agent()).is_err());
    assert!(AuthRequirement::Controller
        .check(&machine_agent().with_controller(true))
        .is_ok());
}

#[test]
fn check_consults_only_the_required_predicate() {
    let mut auth = MockAuthorizer::new();
    auth.expect_auth_controller().times(1).returning(|| false);
    auth.expect_auth_tag().returning(|| Tag::model("m"));
    auth.expect_auth_client().never();
    auth.expect_auth_machine_agent().never();
    auth.expect_auth_unit_agent().never();

    let err = AuthRequirement::Controller.check(&auth).unwrap_err();
    assert!(err.is_permission_denied());
}
