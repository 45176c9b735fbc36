use itinera_core::{
    ClockTime, EnvironmentError, InnercitySegment, RouteRequest, TravelEnvironment,
};

/// Innercity legs from one position to the next, priced for the party.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Transfer {
    pub(crate) legs: Vec<InnercitySegment>,
    pub(crate) arrival: ClockTime,
}

/// Route `request` for `people` travellers.
///
/// Staying put needs no legs. `Ok(None)` means the mode cannot make the
/// trip; any other environment failure is returned as an error.
pub(crate) fn route<E>(
    environment: &E,
    request: &RouteRequest<'_>,
    people: u32,
) -> Result<Option<Transfer>, EnvironmentError>
where
    E: TravelEnvironment + ?Sized,
{
    if request.from == request.to {
        return Ok(Some(Transfer {
            legs: Vec::new(),
            arrival: request.start,
        }));
    }
    match environment.innercity_route(request) {
        Ok(legs) => {
            let arrival = legs.last().map_or(request.start, |leg| leg.end_time);
            Ok(Some(Transfer {
                legs: legs.into_iter().map(|leg| leg.for_party(people)).collect(),
                arrival,
            }))
        }
        Err(EnvironmentError::NoRoute { .. }) => Ok(None),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itinera_core::InnercityMode;
    use itinera_core::test_support::MemoryEnvironment;
    use rstest::rstest;

    fn request(from: &'static str, to: &'static str, mode: InnercityMode) -> RouteRequest<'static> {
        RouteRequest {
            city: "Suzhou",
            from,
            to,
            start: ClockTime::hm(9, 0),
            mode,
        }
    }

    #[rstest]
    fn staying_put_is_free() {
        let environment = MemoryEnvironment::default();
        let transfer = route(&environment, &request("Lion Grove", "Lion Grove", InnercityMode::Taxi), 3);
        assert_eq!(
            transfer.ok().flatten(),
            Some(Transfer {
                legs: Vec::new(),
                arrival: ClockTime::hm(9, 0),
            })
        );
    }

    #[rstest]
    fn metro_legs_are_priced_per_traveller() {
        let environment = MemoryEnvironment::default();
        let transfer = route(&environment, &request("Lion Grove", "Tiger Hill", InnercityMode::Metro), 3)
            .ok()
            .flatten();
        assert_eq!(transfer.as_ref().map(|t| t.arrival), Some(ClockTime::hm(9, 20)));
        let cost: u32 = transfer
            .map(|t| t.legs.iter().map(|leg| leg.cost).sum())
            .unwrap_or_default();
        assert_eq!(cost, 12);
    }

    #[rstest]
    fn missing_modes_are_not_errors() {
        let environment = MemoryEnvironment::default().without_mode(InnercityMode::Taxi);
        let transfer = route(&environment, &request("Lion Grove", "Tiger Hill", InnercityMode::Taxi), 1);
        assert!(matches!(transfer, Ok(None)));
    }
}
