use anyhow::Result;
use teloxide::{
    dispatching::{DpHandlerDescription, HandlerExt, UpdateFilterExt},
    dptree::{self, Handler},
    types::{Message, Update},
};

use crate::{
    bot::{answers::answers, handler::handle_message},
    callbacks::handler::handle_callback_query,
    commands::Command,
};

pub fn handler_tree() -> Handler<'static, Result<()>, DpHandlerDescription> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(dptree::entry().filter_command::<Command>().endpoint(answers))
                .branch(
                    // Post text is only collected in private chats; stray commands are not post text.
                    dptree::entry()
                        .filter(|msg: Message| {
                            msg.chat.is_private()
                                && msg.text().is_some_and(|t| !t.starts_with('/'))
                        })
                        .endpoint(handle_message),
                ),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callback_query))
}
