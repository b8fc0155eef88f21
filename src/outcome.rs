/// Control outcome of a gateway interaction.
///
/// The crate never issues HTTP redirects or writes response bodies itself;
/// it signals what the hosting web layer should do and the web layer
/// realizes the variant as a transport response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Send the payer to the gateway's hosted payment page.
    Redirect(String),
    /// Answer an accepted callback with this exact body. The gateway stops
    /// retrying only when it receives it verbatim.
    Ack(&'static str),
}

impl Outcome {
    pub fn redirect_url(&self) -> Option<&str> {
        match self {
            Outcome::Redirect(url) => Some(url),
            Outcome::Ack(_) => None,
        }
    }
}
