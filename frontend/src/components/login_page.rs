use shared::auth::{self, SignUpResult};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::services::logging::Logger;
use crate::services::Services;

#[derive(Clone, Copy, PartialEq)]
enum Mode {
    SignIn,
    SignUp,
}

#[derive(Properties, PartialEq)]
pub struct LoginPageProps {
    pub services: Services,
}

fn text_setter(field: &UseStateHandle<String>) -> Callback<InputEvent> {
    let field = field.clone();
    Callback::from(move |e: InputEvent| {
        field.set(e.target_unchecked_into::<HtmlInputElement>().value());
    })
}

/// Sign-in and sign-up forms. A successful sign-in is picked up through the
/// auth state listener, so this page only reports failures.
#[function_component(LoginPage)]
pub fn login_page(props: &LoginPageProps) -> Html {
    let mode = use_state(|| Mode::SignIn);
    let name = use_state(String::new);
    let email = use_state(String::new);
    let password = use_state(String::new);
    let error = use_state(|| Option::<String>::None);
    let notice = use_state(|| Option::<String>::None);
    let submitting = use_state(|| false);

    let on_submit = {
        let services = props.services.clone();
        let (mode, name, email, password) = (mode.clone(), name.clone(), email.clone(), password.clone());
        let (error, notice, submitting) = (error.clone(), notice.clone(), submitting.clone());

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *submitting {
                return;
            }
            let services = services.clone();
            let mode = *mode;
            let (name, email, password) = ((*name).clone(), (*email).clone(), (*password).clone());
            let (error, notice, submitting) = (error.clone(), notice.clone(), submitting.clone());

            error.set(None);
            notice.set(None);
            submitting.set(true);

            spawn_local(async move {
                let result = match mode {
                    Mode::SignIn => auth::sign_in(&services.api, &email, &password).await.map(|_| None),
                    Mode::SignUp => auth::sign_up(&services.api, &services.api, &name, &email, &password)
                        .await
                        .map(|outcome| match outcome {
                            SignUpResult::SignedIn(_) => None,
                            SignUpResult::ConfirmationRequired => {
                                Some("Check your email to confirm your account, then sign in.".to_string())
                            }
                        }),
                };
                match result {
                    Ok(message) => notice.set(message),
                    Err(e) => {
                        Logger::warn_with_component("LoginPage", &e.to_string());
                        error.set(Some(e.user_message()));
                    }
                }
                submitting.set(false);
            });
        })
    };

    let switch_mode = {
        let (mode, error, notice) = (mode.clone(), error.clone(), notice.clone());
        Callback::from(move |_: MouseEvent| {
            mode.set(match *mode {
                Mode::SignIn => Mode::SignUp,
                Mode::SignUp => Mode::SignIn,
            });
            error.set(None);
            notice.set(None);
        })
    };

    let (title, submit_label, switch_label) = match *mode {
        Mode::SignIn => ("Sign in", "Sign in", "Need an account? Sign up"),
        Mode::SignUp => ("Create account", "Sign up", "Already have an account? Sign in"),
    };

    html! {
        <section class="login-page">
            <h2>{title}</h2>

            if let Some(message) = (*error).clone() {
                <div class="form-message error">{message}</div>
            }
            if let Some(message) = (*notice).clone() {
                <div class="form-message info">{message}</div>
            }

            <form class="login-form" onsubmit={on_submit}>
                if *mode == Mode::SignUp {
                    <div class="form-group">
                        <label for="name">{"Full name"}</label>
                        <input type="text" id="name" value={(*name).clone()} oninput={text_setter(&name)} disabled={*submitting} />
                    </div>
                }
                <div class="form-group">
                    <label for="email">{"Email"}</label>
                    <input type="email" id="email" value={(*email).clone()} oninput={text_setter(&email)} disabled={*submitting} />
                </div>
                <div class="form-group">
                    <label for="password">{"Password"}</label>
                    <input type="password" id="password" value={(*password).clone()} oninput={text_setter(&password)} disabled={*submitting} />
                </div>
                <button type="submit" class="btn btn-primary" disabled={*submitting}>
                    {if *submitting { "Please wait..." } else { submit_label }}
                </button>
            </form>

            <button class="btn btn-link" onclick={switch_mode}>{switch_label}</button>
        </section>
    }
}
