/// Language of user-facing messages. Only affects message text, never results.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum Lang {
    #[default]
    En,
    De,
}

impl Lang {
    /// Anything but `de` is English
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            Some(lang) if lang.eq_ignore_ascii_case("de") => Lang::De,
            _ => Lang::En,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Message {
    MissingStations,
    IdenticalStations,
    UnresolvableStation,
    NoSameDayDeparture,
    MissingOrigin,
    UnresolvableOrigin,
    NoWeekendOptions,
    InvalidMode,
    ServiceBusy,
}

impl Message {
    pub fn text(self, lang: Lang) -> &'static str {
        match (self, lang) {
            (Message::MissingStations, Lang::En) => "Please choose origin and destination stations.",
            (Message::MissingStations, Lang::De) => "Bitte Start- und Zielbahnhof wählen.",
            (Message::IdenticalStations, Lang::En) => "Origin and destination must be different.",
            (Message::IdenticalStations, Lang::De) => "Start und Ziel dürfen nicht identisch sein.",
            (Message::UnresolvableStation, Lang::En) => "Could not resolve selected station.",
            (Message::UnresolvableStation, Lang::De) => "Bahnhof konnte nicht aufgelöst werden.",
            (Message::NoSameDayDeparture, Lang::En) => "No suitable same-day departure found.",
            (Message::NoSameDayDeparture, Lang::De) => "Keine passende Verbindung bis Tagesende gefunden.",
            (Message::MissingOrigin, Lang::En) => "Please select an origin station.",
            (Message::MissingOrigin, Lang::De) => "Bitte Startbahnhof wählen.",
            (Message::UnresolvableOrigin, Lang::En) => "Could not load origin station.",
            (Message::UnresolvableOrigin, Lang::De) => "Startbahnhof konnte nicht geladen werden.",
            (Message::NoWeekendOptions, Lang::En) => "No weekend options found. Please try again later.",
            (Message::NoWeekendOptions, Lang::De) => "Keine Wochenendoptionen gefunden. Bitte später erneut versuchen.",
            (Message::InvalidMode, Lang::En) => "Invalid mode.",
            (Message::InvalidMode, Lang::De) => "Ungültiger Modus.",
            (Message::ServiceBusy, Lang::En) => "Mobility service is temporarily busy. Please retry in 1-2 minutes.",
            (Message::ServiceBusy, Lang::De) => "Der Mobilitätsdienst ist gerade ausgelastet. Bitte in 1-2 Minuten erneut versuchen.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_de_switches_language() {
        assert_eq!(Lang::from_param(Some("de")), Lang::De);
        assert_eq!(Lang::from_param(Some("DE")), Lang::De);
        assert_eq!(Lang::from_param(Some("fr")), Lang::En);
        assert_eq!(Lang::from_param(None), Lang::En);
    }

    #[test]
    fn messages_are_localized() {
        assert_eq!(Message::InvalidMode.text(Lang::En), "Invalid mode.");
        assert_eq!(Message::InvalidMode.text(Lang::De), "Ungültiger Modus.");
    }
}
