use fltk::{
    app::Sender,
    button::Button,
    enums::{Align, CallbackTrigger, FrameType},
    frame::Frame,
    group::Group,
    input::{Input, InputType},
    prelude::*,
};

use crate::app::messages::Message;
use super::theme::Palette;

/// Single shared-password login, per the backend's auth model.
pub struct LoginView {
    pub group: Group,
    password: Input,
    reveal: Button,
    submit: Button,
    status: Frame,
    title: Frame,
}

/// Input type and button label for the next reveal state.
fn reveal_state(revealed: bool) -> (InputType, &'static str) {
    if revealed {
        (InputType::Normal, "Hide")
    } else {
        (InputType::Secret, "Show")
    }
}

impl LoginView {
    pub fn build(sender: &Sender<Message>) -> Self {
        let group = Group::new(0, 0, 480, 640, None);

        let mut title = Frame::new(90, 200, 300, 40, "Shared Notes");
        title.set_label_size(26);

        let mut password = Input::new(140, 280, 200, 30, "Password");
        password.set_align(Align::Left);
        password.set_type(InputType::Secret);

        let mut reveal = Button::new(345, 280, 55, 30, "Show");
        {
            let mut password = password.clone();
            reveal.set_callback(move |b| {
                let (kind, label) = reveal_state(b.label() == "Show");
                password.set_type(kind);
                b.set_label(label);
                password.redraw();
            });
        }

        let mut status = Frame::new(90, 320, 300, 25, "");
        status.set_label_size(12);

        let mut submit = Button::new(140, 355, 200, 32, "Login");
        submit.set_frame(FrameType::RFlatBox);

        group.end();

        let send_login = {
            let password = password.clone();
            let sender = *sender;
            move || {
                sender.send(Message::SubmitLogin {
                    password: password.value().trim().to_string(),
                });
            }
        };

        let submit_cb = send_login.clone();
        submit.set_callback(move |_| submit_cb());
        password.set_trigger(CallbackTrigger::EnterKeyAlways);
        password.set_callback(move |_| send_login());

        Self {
            group,
            password,
            reveal,
            submit,
            status,
            title,
        }
    }

    pub fn set_status(&mut self, message: &str) {
        self.status.set_label(message);
        self.group.redraw();
    }

    pub fn set_busy(&mut self, busy: bool) {
        if busy {
            self.submit.deactivate();
            self.set_status("Logging in...");
        } else {
            self.submit.activate();
        }
    }

    pub fn reset(&mut self) {
        self.password.set_value("");
        let (kind, label) = reveal_state(false);
        self.password.set_type(kind);
        self.reveal.set_label(label);
        self.set_status("");
        self.set_busy(false);
    }

    pub fn apply_palette(&mut self, palette: &Palette) {
        self.title.set_label_color(palette.text);
        self.password.set_color(palette.field_bg);
        self.password.set_text_color(palette.text);
        self.password.set_label_color(palette.text);
        self.reveal.set_color(palette.panel_bg);
        self.reveal.set_label_color(palette.text);
        self.status.set_label_color(palette.muted_text);
        self.submit.set_color(palette.accent);
        self.submit.set_label_color(fltk::enums::Color::White);
        self.group.redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reveal_cycles_between_secret_and_plain() {
        assert_eq!(reveal_state(false), (InputType::Secret, "Show"));
        assert_eq!(reveal_state(true), (InputType::Normal, "Hide"));
    }
}
