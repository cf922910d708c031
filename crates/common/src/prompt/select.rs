use std::fmt::Display;

use cliclack::Select;

use super::map_interact_error;

pub struct PromptSelect<T> {
    inner: Select<T>,
}

impl<T> PromptSelect<T>
where
    T: Clone + Eq,
{
    pub fn new<I>(question: &str, items: I) -> Self
    where
        T: Display,
        I: IntoIterator<Item = T>,
    {
        let items = items
            .into_iter()
            .map(|item| {
                let label = item.to_string();
                (item, label, "")
            })
            .collect::<Vec<_>>();

        Self {
            inner: Select::new(question).items(&items),
        }
    }

    pub fn ask(mut self) -> anyhow::Result<T> {
        self.inner.interact().map_err(map_interact_error)
    }
}
