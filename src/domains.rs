//! Usable address domains per provider, and random address generation.

use rand::Rng;
use rand::seq::IndexedRandom;

const LOCAL_PART_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of generated local parts.
pub const DEFAULT_LOCAL_PART_LEN: usize = 8;

/// Long-lived mail.td domains.
pub const MAIL_TD_DOMAINS: &[&str] = &["nqmo.com", "qabq.com", "end.tw", "uuf.me", "6n9.net"];

/// Address kinds emailmux can generate. These are sent as `domains`, not used as suffixes.
pub const EMAILMUX_DOMAINS: &[&str] = &["outlook", "hotmail", "gmail_plus", "googlemail"];

/// Domains accepted by gptmail.
#[rustfmt::skip]
pub const GPTMAIL_DOMAINS: &[&str] = &[
    "gravityengine.cc", "14thgainsborough.org.uk", "15thbattalionrelief.com", "14club.org.uk",
    "29thnewport.org.uk", "2ndwhartonscoutgroup.org.uk", "3littlemiracles.com", "aard.org.uk",
    "abrahampath.org.uk", "aiccministry.com", "allumhall.co.uk", "almiswelfare.org",
    "amyfalconer.co.uk", "avarthanas.org", "aylshamrotary.club", "bbfcharity.org",
    "birdsedgevillagehall.co.uk", "bletsoetownclosecharity.bio", "bodyofchristministries.co.uk",
    "bp-hall.co.uk", "brendansbridge.org.uk", "brentwoodmdc.org", "cade.org.uk", "caye.org.uk",
    "cccnoahsark.com", "cccvojc.org", "cementingfutures.org", "cephastrust.org", "chatgptuk.pp.ua",
    "christchurchandstgeorges.org", "christchurchsouthend.org.uk", "cketrust.org",
    "club106.org.uk", "cockertonmethodist.org.uk", "cok.org.uk", "counsellingit.org",
    "cumnorthampton.org", "cwetg.co.uk", "dormerhouseschool.co.uk", "dpmcharity.org",
    "eapn-england.org", "educationossett.co.uk", "egremonttrust.org.uk",
    "engagefordevelopment.org", "e-quiparts.org.uk", "f4jobseekers.org.uk",
    "flushingvillageclub.org.uk", "fordslane.org.uk", "freemails.pp.ua", "friendsofkms.org.uk",
    "gadshillplace.com", "goleudy.org.uk", "gospelassembly.org.uk", "gospelgeneration.org.uk",
    "gracesanctuary-rccg.co.uk", "greyhoundwalks.org.uk", "gyan-netra.com", "haslemerecfr.org.uk",
    "hfh4elderly.org", "hhe.org.uk", "hottchurch.org.uk", "huddsdeafcentre.org", "hvcrc.org",
    "ingrambreamishvalley.co.uk", "iqraacademy.org.uk", "iraniandsa.org", "kbishwanathuk.cc",
    "kempsonplayers.org", "lbatrust.co.uk", "leicscoopband.co.uk", "lflct.org.uk",
    "living-water.org.uk", "lovecambodia.co.uk", "lutonsymphony.com", "macclesfieldmvc.org.uk",
    "milnerinstitute.org", "mtdalmshouse.fitness", "musicatleamingtonhastings.co.uk",
    "neuaddowen.org.uk", "newdoorsproject.org", "newhoperelief.org", "newlifedorking.org.uk",
    "newlifefellowshipuk.com", "ngbotima.com", "nnrbc.org", "northboveymeadow.business",
    "ocgm.org.uk", "ofcinternational.org", "oughtibridgechapel.org.uk", "ozznx.com",
    "paulnormantrust.org", "pierre-angulaire.org", "pjm-trust.org", "pontfest.org.uk",
    "portsmouthchorus.org", "powysbarnowls.com", "ppedu.pp.ua", "rainbownews.org",
    "rawdhah.academy", "rccg-clf.org", "rccgvhr.org", "resthavencare.org.uk", "rhalmshouse.church",
    "rhydwilym.com", "riyo.org.uk", "rmtcweb.co.uk", "sanity-uk.org", "sawley-scouts.org.uk",
    "sbmen.org", "scrivenertrust.org", "sidneymichaelpoland.travel", "skmet.co.uk", "solwmi.org",
    "steptogetherdance.org.uk", "stmarysplaygroupbanbury.org", "stmichaelsflixton.co.uk",
    "svmc.org.uk", "tasmforvictory.com", "tatendatrust.org.uk", "theadmiraltrust.org.uk",
    "thestuartfeakinstrust.com", "thewonderbus.org", "thurleighchurchestate.church",
    "tlcappealeastkent.co.uk", "tradamis.org", "trees-surrey.org.uk", "vision15.co.uk",
    "vpachurch.org", "westraintonjubileehall.org.uk", "weymouthdramaclub.co.uk", "wofmission.org",
    "wohbc.org.uk", "wordlifecentre.org", "wsmptfa.org.uk", "wyldegreenurc.org.uk",
    "xxmailedu.dpdns.org", "yetga.co.uk", "zawauk.org", "zumuntahassociationuk.org",
    "blogger.nyc.mn", "bradingtowntrust.me", "education.nyc.mn", "fdacharity.me", "forum.nyc.mn",
    "gsoleyfoyle.me", "harrowschool.me", "honourable.me", "student.nyc.mn", "2ndleekscouts.co.uk",
    "2ndurmstonscoutgroup.org.uk", "30thbrighton.org.uk", "4thkenton.co.uk", "aberllefenni.co.uk",
    "advantageyoungpeople.com", "afgpuk.co.uk", "ahavaexperience.com", "alarafoundation.com",
    "aldermansteevens.me", "aldworthlodge.org.uk", "alhsalumni.org", "amingod.org", "aoac.org.uk",
    "apassionforafrica.com", "aslactongreatmoulton.co.uk", "baileybridge.org",
    "beautifulblessingsbeyondborders.org", "beevorband.co.uk", "berkshirephab.org",
    "bidefordroundtable.co.uk", "birminghamlife.org.uk", "bishwanathuk.cc",
    "blackboyspreschool.org.uk", "bowespreschool.co.uk", "bradingtowntrust.co.uk",
    "braishfield-pc.org", "breakthru-youth.co.uk", "bridgetonmainstreet.org",
    "buckinghampreschoolplaygroup.co.uk", "burscoughscoutgroup.co.uk", "cantercare.org",
    "cclondres.com", "charityrcao.org.uk", "chorltonhighschool.me", "christianartstrust.org.uk",
    "church180mcr.co.uk", "churchestate.org.uk", "churchhousemanaton.co.uk", "cibf.org.uk",
    "cityunitedacademy.me", "clanfieldpreschool.org", "corbyrise.com",
    "cornwallaerospaceeducationtrust.org", "crawshaypreschool.com", "cridlingstubbs.org.uk",
    "croxtonresthomes.me", "cubbingtonsilverband.com", "dawsoncountygunclub.org",
    "dialsouthend.org", "dmcelements.org", "dominion-chapel.org", "dunsvillecommunitycentre.co.uk",
    "eastcombe.org", "ecclesallpreschool.org.uk", "empa.org.uk", "epurcf.org",
    "felixstowemusicaltheatre.co.uk", "fighthunger.co.uk", "fightingzebras.org",
    "finchleychoral.info", "finchleychoral.org.uk", "findmeghana.org", "fmgt.org.uk",
    "forgetmenotstudio.org.uk", "fortonscouts.co.uk", "fosmcalne.org.uk",
    "frankhealeyfoundation.org", "freedomcentremereside.org", "friendsceredigionmuseum.com",
    "friendsofbram.com", "friendsofmeresworth.co.uk", "friendsofstnicholasgw.co.uk",
    "gemmarosefoundation.co.uk", "georgefletcher.org.uk", "georgeheddon.co.uk",
    "girlguidingmarchdistrict.org", "givetoeducation.org", "glawn.org.uk", "gotrak.org",
    "gracechurchcc.org.uk", "gsoleyfoyle.org.uk", "gururavidas.org.uk", "hampshireschools.org.uk",
    "handsofhelpinc.org", "happyheadshed.org", "harescombe.me", "harpendenhelpinghand.co.uk",
    "hayfield-civic-trust.org.uk", "healingheartmission.org", "heatherpreschool.co.uk",
    "heyshamcommunitypreschool.co.uk", "hmh.org.uk", "howardgiving.org",
    "huttonandhowick-wi.org.uk", "hyndmans.org.uk", "ickletonrelief.co.uk", "ikfoundation.org.uk",
    "innerwheelherefordwyevalley.org", "isaiahtrust.org.uk", "islandsportstrust.co.uk",
    "jamesjfattorini.rocks", "jamesthynnealmshouse.co.uk", "jjfcharitabletrust.co.uk",
    "kempstoncharities.band", "kempstoncharities.co.uk", "keswacharity.com", "kongochild.com",
    "lifecaretrust.org.uk", "lifetreechurch.co.uk", "lighthouseconnect.co.uk",
    "littlemissendenvillagehall.org", "littlemvh.org.uk", "lordfortescue.news",
    "lordfortescue.org.uk", "lostnow.org", "marchguidesassociation.org",
    "marchguidesassociation.org.uk", "markableytrust.org.uk", "markandvirginiarometty.org",
    "marygrangeruk.com", "mcaslan-family-trust.com", "medicichoir.org", "meef.uk",
    "middletoncheneyuc.uk", "millenniumharvest.org", "moorlandwaldorf.org",
    "mosswoodmissionhall.bio", "mstdc.org.uk", "mstp.co.uk", "mtdalmshouse.uk", "myfreedom.church",
    "nationalpolicecommunitytrust.org", "nctabernacle.org", "newsteadabbeypartnership.org",
    "noizonicfoundation.com", "nondet.org.uk", "oneummahorg.uk", "orangeandgrey.org.uk",
    "owfa.org.uk", "pandorasboxproductions.org", "parkertrust.org.uk",
    "penkridgesportsandrecreationcentre.org", "peperharowunitedcharities.me", "phccsouthend.co.uk",
    "phdf.co.uk", "pigletspreschool.org.uk", "pkcommunityassociation.co.uk", "placenet.org.uk",
    "prestige-leadership.org", "qlhub.org.uk", "rafawrekin-wellington.co.uk",
    "rccglivingspring.org.uk", "recreationgroundparish.me", "reverendneedham.co.uk",
    "rewardtrust.org.uk", "rhalmshouse.co.uk", "rhythm-uk.org", "rnyf.org", "rosemarytrust.org",
    "royalpriesthoodagc.org.uk", "rtrobinsbequest.org.uk", "rudhamlittleowls.co.uk", "sanauk.org",
    "sargeantmemorial.me", "sasanaramsiuk.org", "schoolsofcheshamcarnival.org.uk",
    "seasonofgrace.org", "selcc.org.uk", "sitwelltownlands.org.uk", "slyouthuk.org",
    "smpcharity.co.uk", "somervillepreschool.co.uk", "southeastessexanimal.uk",
    "specialneedscircle.co.uk", "stangroundcc.co.uk", "staplehurstunder5.co.uk", "steddfota.org",
    "stevenagechoral.org.uk", "stevenstrust.org", "stmaryswendover.org.uk",
    "stpaulsgrammaralumniusa.org", "streetlevel.org.uk", "sunnysideplaygroup.org.uk",
    "surbitonnewlifebaptist.com", "sussexotters.org.uk", "svps.org.uk",
    "swanseawomenscentre.co.uk", "sweynechoralsociety.org.uk", "sylvaniahall.co.uk",
    "sytchamptoncc.co.uk", "sytchampton.directory", "teamnewmexico.org",
    "telfordchineseschool.org.uk", "thameschamberorchestra.co.uk", "thedorsetcarershub.org",
    "thefullgospelhall.org", "thelifecentre.org.uk", "thomasblackerby.org.uk",
    "timbourkescholarshipfund.org", "tivertonhospitalleagueoffriends.co.uk",
    "trainthem2fish.co.uk", "transtanz.org", "tsdpt.co.uk", "tstrust.org.uk",
    "turveynonecclesiastical.com", "ukev.org", "ukmcs.org", "unitedcharitiesosm.org.uk",
    "valueineveryone.co.uk", "vernonbourne.uk", "vfwladiesauxin.org", "voicesforchangeinc.org",
    "waisfoundation.com", "wargravepreschool.com", "wargravepreschool.online",
    "wargravepreschool.uk", "wcmf.org.uk", "weldonpreschool.co.uk", "wessexlodge4093.org",
    "whirlygirlink.org", "wicfolhumanservices.org", "winantclayton.org.uk", "wmct.info",
    "wohbc.co.uk", "writtlescoutgroup.org", "wtjinkintrust.co.uk", "londonyouthsailing.org",
];

/// Random local part of `len` lowercase letters and digits.
pub fn random_local_part<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(LOCAL_PART_CHARSET[rng.random_range(0..LOCAL_PART_CHARSET.len())]))
        .collect()
}

/// Random address on one of `domains`. `None` when the list is empty.
pub fn random_address<R: Rng, S: AsRef<str>>(rng: &mut R, domains: &[S]) -> Option<String> {
    let domain = domains.choose(rng)?;
    let local = random_local_part(rng, DEFAULT_LOCAL_PART_LEN);
    Some(format!("{}@{}", local, domain.as_ref()))
}
