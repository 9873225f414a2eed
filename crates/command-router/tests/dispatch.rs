mod common;

use command_router::{Command, CommandSource, RouterError};
use common::{
    chat, message, router, verify_command, FixedVerification, Reply, ScriptedHandler,
    ADMIN_CHANNEL, DM_CHANNEL, GROUP_DM_CHANNEL, OTHER_CHANNEL, PRIMARY_CHANNEL,
};

const HELP: &str =
    "verify <profile url>\nLink your forum account\nverify https://forum.example.com/profile/21-alice/";

#[tokio::test]
async fn trigger_lookup_is_case_insensitive() {
    let chat = chat();
    let handler = ScriptedHandler::new(Reply::Success);
    let router = router(vec![verify_command(handler.clone())], chat.clone(), FixedVerification::of(&[]));

    let outcome = router
        .process(&message(DM_CHANNEL, "VERIFY https://forum.example.com/profile/21-alice/"))
        .await;

    assert!(outcome.exists);
    assert_eq!(outcome.source, Some(CommandSource::Private));
    assert!(outcome.errors.is_empty());
    assert_eq!(handler.calls(), vec!["https://forum.example.com/profile/21-alice/"]);
    assert_eq!(chat.typing(), vec![DM_CHANNEL]);
}

#[tokio::test]
async fn unknown_trigger_is_silent() {
    let chat = chat();
    let router = router(
        vec![verify_command(ScriptedHandler::new(Reply::Success))],
        chat.clone(),
        FixedVerification::of(&[]),
    );

    let outcome = router.process(&message(DM_CHANNEL, "hello there")).await;

    assert!(!outcome.exists);
    assert!(outcome.source.is_none());
    assert!(outcome.errors.is_empty());
    assert!(chat.messages().is_empty());
    assert!(chat.typing().is_empty());
}

#[tokio::test]
async fn unknown_trigger_skips_channel_lookup() {
    let chat = chat();
    chat.fail_lookups(true);
    let router = router(
        vec![verify_command(ScriptedHandler::new(Reply::Success))],
        chat.clone(),
        FixedVerification::of(&[]),
    );

    let outcome = router.process(&message(OTHER_CHANNEL, "just chatting")).await;

    assert!(!outcome.exists);
    assert!(outcome.source.is_none());
    assert!(outcome.errors.is_empty());
}

#[tokio::test]
async fn group_dm_is_not_private() {
    let chat = chat();
    let handler = ScriptedHandler::new(Reply::Success);
    let router = router(vec![verify_command(handler.clone())], chat.clone(), FixedVerification::of(&[]));

    let outcome = router
        .process(&message(GROUP_DM_CHANNEL, "verify https://forum.example.com/profile/21-alice/"))
        .await;

    assert!(outcome.exists);
    assert_eq!(outcome.source, Some(CommandSource::Other));
    assert!(handler.calls().is_empty());
    assert!(chat.typing().is_empty());
}

#[tokio::test]
async fn wrong_source_is_never_invoked() {
    let chat = chat();
    let handler = ScriptedHandler::new(Reply::Success);
    let router = router(vec![verify_command(handler.clone())], chat.clone(), FixedVerification::of(&[]));

    for channel in [PRIMARY_CHANNEL, ADMIN_CHANNEL, OTHER_CHANNEL] {
        let outcome = router
            .process(&message(channel, "verify https://forum.example.com/profile/21-alice/"))
            .await;
        assert!(outcome.exists);
        assert_ne!(outcome.source, Some(CommandSource::Private));
        assert!(outcome.errors.is_empty());
    }

    assert!(handler.calls().is_empty());
    assert!(chat.messages().is_empty());
    assert!(chat.typing().is_empty());
}

#[tokio::test]
async fn empty_argument_gets_usage() {
    let chat = chat();
    let handler = ScriptedHandler::new(Reply::Success);
    let router = router(vec![verify_command(handler.clone())], chat.clone(), FixedVerification::of(&[]));

    let outcome = router.process(&message(DM_CHANNEL, "verify")).await;

    assert!(outcome.exists);
    assert!(outcome.errors.is_empty());
    assert!(handler.calls().is_empty());
    assert_eq!(chat.messages_to(DM_CHANNEL), vec![HELP]);
}

#[tokio::test]
async fn two_arguments_get_usage() {
    let chat = chat();
    let handler = ScriptedHandler::new(Reply::Success);
    let router = router(vec![verify_command(handler.clone())], chat.clone(), FixedVerification::of(&[]));

    router.process(&message(DM_CHANNEL, "verify one two")).await;

    assert!(handler.calls().is_empty());
    assert_eq!(chat.messages_to(DM_CHANNEL), vec![HELP]);
    assert!(chat.typing().is_empty());
}

#[tokio::test]
async fn unusable_input_gets_usage_after_running() {
    let chat = chat();
    let handler = ScriptedHandler::new(Reply::Unusable);
    let router = router(vec![verify_command(handler.clone())], chat.clone(), FixedVerification::of(&[]));

    let outcome = router.process(&message(DM_CHANNEL, "verify not-a-url")).await;

    assert!(outcome.errors.is_empty());
    assert_eq!(handler.calls(), vec!["not-a-url"]);
    assert_eq!(chat.messages_to(DM_CHANNEL), vec![HELP]);
}

#[tokio::test]
async fn handler_error_is_surfaced_without_usage() {
    let chat = chat();
    let router = router(
        vec![verify_command(ScriptedHandler::new(Reply::Fail))],
        chat.clone(),
        FixedVerification::of(&[]),
    );

    let outcome = router.process(&message(DM_CHANNEL, "verify x")).await;

    assert_eq!(outcome.errors.len(), 1);
    assert!(matches!(&outcome.errors[0], RouterError::Handler { trigger, .. } if trigger == "verify"));
    assert!(chat.messages().is_empty());
}

#[tokio::test]
async fn channel_lookup_failure_is_surfaced() {
    let chat = chat();
    chat.fail_lookups(true);
    let handler = ScriptedHandler::new(Reply::Success);
    let router = router(vec![verify_command(handler.clone())], chat.clone(), FixedVerification::of(&[]));

    let outcome = router.process(&message(DM_CHANNEL, "verify x")).await;

    assert!(outcome.exists);
    assert!(outcome.source.is_none());
    assert!(matches!(outcome.errors.as_slice(), [RouterError::ChannelLookup { .. }]));
    assert!(handler.calls().is_empty());
}

#[tokio::test]
async fn typing_failure_aborts() {
    let chat = chat();
    chat.fail_typing(true);
    let handler = ScriptedHandler::new(Reply::Success);
    let router = router(vec![verify_command(handler.clone())], chat.clone(), FixedVerification::of(&[]));

    let outcome = router.process(&message(DM_CHANNEL, "verify x")).await;

    assert!(matches!(outcome.errors.as_slice(), [RouterError::Typing { .. }]));
    assert!(handler.calls().is_empty());
}

#[tokio::test]
async fn unverified_user_is_told_to_verify() {
    let chat = chat();
    let handler = ScriptedHandler::new(Reply::Success);
    let command = Command::new("roll", CommandSource::Primary, handler.clone()).require_verified();
    let router = router(vec![command], chat.clone(), FixedVerification::of(&["2002"]));

    let outcome = router.process(&message(PRIMARY_CHANNEL, "roll")).await;

    assert!(outcome.errors.is_empty());
    assert!(handler.calls().is_empty());
    let replies = chat.messages_to(PRIMARY_CHANNEL);
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("verify"));
}

#[tokio::test]
async fn verified_user_runs_command() {
    let chat = chat();
    let handler = ScriptedHandler::new(Reply::Success);
    let command = Command::new("roll", CommandSource::Primary, handler.clone()).require_verified();
    let router = router(vec![command], chat.clone(), FixedVerification::of(&["1001"]));

    router.process(&message(PRIMARY_CHANNEL, "roll")).await;

    assert_eq!(handler.calls(), vec![""]);
}

#[tokio::test]
async fn verification_check_failure_is_surfaced() {
    let chat = chat();
    let handler = ScriptedHandler::new(Reply::Success);
    let command = Command::new("roll", CommandSource::Primary, handler.clone()).require_verified();
    let router = router(vec![command], chat.clone(), FixedVerification::failing());

    let outcome = router.process(&message(PRIMARY_CHANNEL, "roll")).await;

    assert!(matches!(
        outcome.errors.as_slice(),
        [RouterError::VerificationCheck { .. }]
    ));
    assert!(handler.calls().is_empty());
}

#[tokio::test]
async fn admin_command_runs_in_admin_channel() {
    let chat = chat();
    let handler = ScriptedHandler::new(Reply::Success);
    let command = Command::new("whois", CommandSource::Administrative, handler.clone())
        .parameters(1, 1)
        .require_admin();
    let router = router(vec![command], chat.clone(), FixedVerification::of(&[]));

    let outcome = router.process(&message(ADMIN_CHANNEL, "whois 1001")).await;
    assert_eq!(outcome.source, Some(CommandSource::Administrative));
    assert_eq!(handler.calls(), vec!["1001"]);

    router.process(&message(OTHER_CHANNEL, "whois 1001")).await;
    assert_eq!(handler.calls().len(), 1);
}

#[tokio::test]
async fn usage_reply_failure_is_collected() {
    let chat = chat();
    chat.fail_sends(true);
    let router = router(
        vec![verify_command(ScriptedHandler::new(Reply::Success))],
        chat.clone(),
        FixedVerification::of(&[]),
    );

    let outcome = router.process(&message(DM_CHANNEL, "verify")).await;

    assert!(matches!(outcome.errors.as_slice(), [RouterError::Reply { .. }]));
}
