/// Intro narration: reveals a fixed text one character per tick.

pub const NARRATION: &str = "태초의 뱀파이어를 방문하게 된 당신.\n\
하지만 저택은 생각보다 외진 곳에 있는데…\n\
과연 시간 내에 길을 찾아갈 수 있을까?";

#[derive(Clone, Debug)]
pub struct Narrator {
    text: String,
    /// Byte offset of the end of the visible prefix.
    shown: usize,
}

impl Narrator {
    pub fn new(text: &str) -> Self {
        Narrator { text: text.to_string(), shown: 0 }
    }

    /// Reveal one more character. Returns false once the text is complete.
    pub fn tick(&mut self) -> bool {
        match self.text[self.shown..].chars().next() {
            Some(ch) => {
                self.shown += ch.len_utf8();
                true
            }
            None => false,
        }
    }

    pub fn visible(&self) -> &str {
        &self.text[..self.shown]
    }

    pub fn full_text(&self) -> &str {
        &self.text
    }

    pub fn is_complete(&self) -> bool {
        self.shown == self.text.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_after_one_tick_per_char() {
        let mut n = Narrator::new(NARRATION);
        let len = NARRATION.chars().count();
        for i in 0..len {
            assert!(!n.is_complete(), "complete too early at tick {i}");
            assert!(n.tick());
        }
        assert!(n.is_complete());
        assert_eq!(n.visible(), NARRATION);
        assert!(!n.tick());
        assert_eq!(n.visible(), NARRATION);
    }

    #[test]
    fn visible_text_only_grows() {
        let mut n = Narrator::new("ab\ncd");
        let mut last = 0;
        while n.tick() {
            assert!(n.visible().len() > last);
            assert!(n.full_text().starts_with(n.visible()));
            last = n.visible().len();
        }
    }

    #[test]
    fn multibyte_text_reveals_whole_chars() {
        let mut n = Narrator::new("태초의 뱀파이어");
        n.tick();
        assert_eq!(n.visible(), "태");
        n.tick();
        assert_eq!(n.visible(), "태초");
    }

    #[test]
    fn empty_text_is_complete_immediately() {
        let n = Narrator::new("");
        assert!(n.is_complete());
    }
}
