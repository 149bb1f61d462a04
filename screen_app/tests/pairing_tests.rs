use rand::thread_rng;
use screen_app::{
    Interceptor, PairingCode, PairingError, Phone, Screen, DEFAULT_PARAMS, HELLO,
};

#[test]
fn honest_pairing_agrees() {
    let mut rng = thread_rng();

    for _ in 0..16 {
        let screen = Screen::new(&mut rng);
        let phone = Phone::new(screen.code());

        let screen_hs = screen.begin(&DEFAULT_PARAMS, &mut rng);
        let phone_hs = phone.begin(&DEFAULT_PARAMS, &mut rng);
        let (screen_pk, phone_pk) = (screen_hs.public_key(), phone_hs.public_key());

        let screen_session = screen_hs.establish(&phone_pk);
        let phone_session = phone_hs.establish(&screen_pk);

        assert!(screen_session.key() == phone_session.key());
        assert_eq!(phone_session.decrypt(&screen_session.hello().unwrap()).unwrap(), HELLO);
    }
}

#[test]
fn wrong_code_breaks_pairing() {
    let mut rng = thread_rng();
    let screen = Screen::new(&mut rng);
    let wrong = PairingCode::new((screen.code().value() + 1) % 10_000).unwrap();
    let phone = Phone::new(wrong);

    let screen_hs = screen.begin(&DEFAULT_PARAMS, &mut rng);
    let phone_hs = phone.begin(&DEFAULT_PARAMS, &mut rng);
    let (screen_pk, phone_pk) = (screen_hs.public_key(), phone_hs.public_key());

    let screen_session = screen_hs.establish(&phone_pk);
    let phone_session = phone_hs.establish(&screen_pk);

    assert!(screen_session.key() != phone_session.key());
    assert_ne!(
        phone_session.decrypt(&screen_session.hello().unwrap()).ok(),
        Some(HELLO.to_vec())
    );
}

#[test]
fn interceptor_recovers_code_and_keys() {
    let mut rng = thread_rng();
    let screen = Screen::new(&mut rng);
    let phone = Phone::new(screen.code());

    let screen_hs = screen.begin(&DEFAULT_PARAMS, &mut rng);
    let phone_hs = phone.begin(&DEFAULT_PARAMS, &mut rng);
    let mallory = Interceptor::new(&DEFAULT_PARAMS, &mut rng);

    let (screen_pk, phone_pk) = (screen_hs.public_key(), phone_hs.public_key());
    let screen_session = screen_hs.establish(&mallory.public_key_for_server());
    let phone_session = phone_hs.establish(&mallory.public_key_for_client());

    let code = mallory
        .recover_code(&screen_session.hello().unwrap(), &screen_pk)
        .unwrap();
    assert_eq!(code, screen.code());

    let keys = mallory.session_keys(code, &screen_pk, &phone_pk);
    assert!(&keys.server == screen_session.key());
    assert!(&keys.client == phone_session.key());

    // relay a message from the phone to the screen, reading it on the way
    let from_phone = phone_session.encrypt(b"seat 14c").unwrap();
    let read = keys.client.open(&from_phone).unwrap();
    assert_eq!(read, b"seat 14c");
    let relayed = keys.server.seal(&read).unwrap();
    assert_eq!(screen_session.decrypt(&relayed).unwrap(), b"seat 14c");
}

#[test]
fn recover_code_fails_without_greeting() {
    let mut rng = thread_rng();
    let screen = Screen::new(&mut rng);
    let screen_hs = screen.begin(&DEFAULT_PARAMS, &mut rng);
    let mallory = Interceptor::new(&DEFAULT_PARAMS, &mut rng);

    let screen_pk = screen_hs.public_key();
    let screen_session = screen_hs.establish(&mallory.public_key_for_server());
    let goodbye = screen_session.encrypt(b"goodbye").unwrap();

    assert!(matches!(
        mallory.recover_code(&goodbye, &screen_pk),
        Err(PairingError::CodeNotFound { tried: 10_000 })
    ));
}
